// ── Capability schema parser ──
//
// Decodes the vendor's heterogeneous capability `parameters` payloads into
// typed descriptors, once, at view construction time. Nothing here does
// I/O. Malformed or unknown entries are skipped with a warning -- one bad
// capability never aborts a device's setup.

use serde_json::{Value, json};
use tracing::warn;

use crate::model::Capability;

// ── On/off ───────────────────────────────────────────────────────────

/// Bidirectional mapping between the raw on/off option values and the
/// abstract power state.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerTable {
    on: Value,
    off: Value,
}

impl PowerTable {
    /// Build from an `on_off` capability's `parameters.options` list.
    pub fn from_capability(cap: &Capability) -> Option<Self> {
        let options = cap.parameters.as_ref()?.get("options")?.as_array()?;
        let mut on = None;
        let mut off = None;
        for option in options {
            match option.get("name").and_then(Value::as_str) {
                Some("on") => on = option.get("value").cloned(),
                Some("off") => off = option.get("value").cloned(),
                _ => {}
            }
        }
        match (on, off) {
            (Some(on), Some(off)) => Some(Self { on, off }),
            _ => {
                warn!(instance = %cap.instance, "on_off capability missing on/off options");
                None
            }
        }
    }

    /// The raw value for the requested power state.
    pub fn raw(&self, on: bool) -> Value {
        if on { self.on.clone() } else { self.off.clone() }
    }

    /// Whether a raw value means "on". Unknown values are neither.
    pub fn is_on(&self, raw: &Value) -> bool {
        *raw == self.on
    }
}

// ── Range ────────────────────────────────────────────────────────────

/// Numeric bounds for a range capability instance (brightness, humidity).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBounds {
    pub min: i64,
    pub max: i64,
}

impl RangeBounds {
    pub fn from_capability(cap: &Capability) -> Option<Self> {
        let range = cap.parameters.as_ref()?.get("range")?;
        let min = range.get("min")?.as_i64()?;
        let max = range.get("max")?.as_i64()?;
        if min >= max {
            warn!(instance = %cap.instance, min, max, "degenerate range bounds");
            return None;
        }
        Some(Self { min, max })
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

// ── Color setting ────────────────────────────────────────────────────

/// What a light's `color_setting` capabilities advertise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorCaps {
    /// RGB control present (`colorRgb` instance).
    pub rgb: bool,
    /// Color-temperature bounds in Kelvin (`colorTemperatureK` instance).
    pub temperature: Option<RangeBounds>,
}

impl ColorCaps {
    /// Fold one `color_setting` capability into the descriptor.
    pub fn absorb(&mut self, cap: &Capability) {
        match cap.instance.as_str() {
            "colorRgb" => self.rgb = true,
            "colorTemperatureK" => {
                self.temperature = RangeBounds::from_capability(cap).or(Some(RangeBounds {
                    min: 2000,
                    max: 9000,
                }));
            }
            other => warn!(instance = other, "unknown color_setting instance"),
        }
    }
}

// ── Work mode ────────────────────────────────────────────────────────

/// The `{workMode, modeValue}` pair a named mode reconstructs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeValue {
    pub work_mode: i64,
    pub mode_value: i64,
}

/// Bidirectional table from human-facing mode names to command values.
///
/// Built by walking a `work_mode` capability's field tree: the `workMode`
/// field enumerates top-level modes; a paired `modeValue` field carries
/// either direct values or a nested sub-tree (e.g. `gearMode`) whose leaf
/// options flatten into one named mode each, sharing the parent's
/// `workMode` code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeTable {
    entries: Vec<(String, ModeValue)>,
}

impl ModeTable {
    pub fn from_capability(cap: &Capability) -> Option<Self> {
        let fields = cap.parameters.as_ref()?.get("fields")?.as_array()?;
        let find_field = |name: &str| {
            fields
                .iter()
                .find(|f| f.get("fieldName").and_then(Value::as_str) == Some(name))
        };
        let work_options = find_field("workMode")?.get("options")?.as_array()?;
        let value_options = find_field("modeValue")
            .and_then(|f| f.get("options"))
            .and_then(Value::as_array);

        let mut table = Self::default();
        for mode in work_options {
            let Some((mode_name, work_mode)) = option_name_value(mode) else {
                warn!(instance = %cap.instance, "skipping malformed workMode option");
                continue;
            };

            // A modeValue entry with the same name and a nested option list
            // means this mode has sub-modes: flatten each leaf to its own
            // named mode carrying the parent's workMode code.
            let nested = value_options.and_then(|opts| {
                opts.iter()
                    .find(|o| o.get("name").and_then(Value::as_str) == Some(mode_name))
                    .and_then(|o| o.get("options"))
                    .and_then(Value::as_array)
            });

            match nested {
                Some(leaves) => {
                    for leaf in leaves {
                        let Some((leaf_name, leaf_value)) = option_name_value(leaf) else {
                            warn!(instance = %cap.instance, "skipping malformed sub-mode option");
                            continue;
                        };
                        table.insert(leaf_name, ModeValue {
                            work_mode,
                            mode_value: leaf_value,
                        });
                    }
                }
                None => {
                    table.insert(mode_name, ModeValue {
                        work_mode,
                        mode_value: 0,
                    });
                }
            }
        }

        if table.entries.is_empty() {
            None
        } else {
            Some(table)
        }
    }

    fn insert(&mut self, name: &str, value: ModeValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name.to_owned(), value)),
        }
    }

    /// All mode names, in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The command value for a named mode.
    pub fn command_value(&self, name: &str) -> Option<Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| {
            json!({"workMode": v.work_mode, "modeValue": v.mode_value})
        })
    }

    /// Reverse lookup: the mode name for a raw `{workMode, modeValue}` pair.
    ///
    /// Any value previously produced by [`command_value`](Self::command_value)
    /// resolves; everything else is `None` (rendered as "unknown" upstream).
    pub fn resolve(&self, work_mode: i64, mode_value: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| v.work_mode == work_mode && v.mode_value == mode_value)
            .map(|(n, _)| n.as_str())
    }

    /// Reverse lookup from a raw state value. Missing `modeValue` reads as 0.
    pub fn resolve_value(&self, value: &Value) -> Option<&str> {
        let work_mode = value.get("workMode").and_then(Value::as_i64)?;
        let mode_value = value.get("modeValue").and_then(Value::as_i64).unwrap_or(0);
        self.resolve(work_mode, mode_value)
    }
}

fn option_name_value(option: &Value) -> Option<(&str, i64)> {
    let name = option.get("name")?.as_str()?;
    let value = option.get("value")?.as_i64()?;
    Some((name, value))
}

// ── Dynamic scenes ───────────────────────────────────────────────────

/// One addressable scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneRef {
    pub id: i64,
    pub param_id: i64,
}

/// Scene-name table: the curated built-in catalog merged with whatever the
/// cloud enumerates for the device's SKU (fetched entries win on name).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTable {
    entries: Vec<(String, SceneRef)>,
}

impl SceneTable {
    /// The always-available curated catalog.
    pub fn builtin() -> Self {
        Self {
            entries: crate::scenes::DEFAULT_SCENES
                .iter()
                .map(|&(name, id, param_id)| (name.to_owned(), SceneRef { id, param_id }))
                .collect(),
        }
    }

    /// Merge a fetched `dynamic_scene` capability's options on top of the
    /// catalog. Malformed options are skipped.
    pub fn merge_capability(&mut self, cap: &Capability) {
        let Some(options) = cap
            .parameters
            .as_ref()
            .and_then(|p| p.get("options"))
            .and_then(Value::as_array)
        else {
            warn!(instance = %cap.instance, "dynamic_scene capability without options");
            return;
        };
        for option in options {
            let name = option.get("name").and_then(Value::as_str);
            let value = option.get("value");
            let id = value.and_then(|v| v.get("id")).and_then(Value::as_i64);
            let (Some(name), Some(id)) = (name, id) else {
                warn!("skipping malformed scene option: {option}");
                continue;
            };
            let param_id = value
                .and_then(|v| v.get("paramId"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            let scene = SceneRef { id, param_id };
            match self.entries.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) => *existing = scene,
                None => self.entries.push((name.to_owned(), scene)),
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn command_value(&self, name: &str) -> Option<Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| json!({"id": s.id, "paramId": s.param_id}))
    }

    /// Reverse lookup by scene id (the state value only echoes the id).
    pub fn resolve_id(&self, id: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, s)| s.id == id)
            .map(|(n, _)| n.as_str())
    }
}

impl Default for SceneTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ── Music modes ──────────────────────────────────────────────────────

const MUSIC_PREFIX: &str = "Music: ";
const DEFAULT_SENSITIVITY: i64 = 50;

/// Music-reactive mode table with the vendor's documented defaults
/// (sensitivity 50, automatic coloring on).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MusicTable {
    entries: Vec<(String, i64)>,
}

impl MusicTable {
    pub fn from_capability(cap: &Capability) -> Option<Self> {
        let fields = cap.parameters.as_ref()?.get("fields")?.as_array()?;
        let options = fields
            .iter()
            .find(|f| f.get("fieldName").and_then(Value::as_str) == Some("musicMode"))?
            .get("options")?
            .as_array()?;

        let mut table = Self::default();
        for option in options {
            let Some((name, value)) = option_name_value(option) else {
                warn!(instance = %cap.instance, "skipping malformed music mode option");
                continue;
            };
            table.entries.push((format!("{MUSIC_PREFIX}{name}"), value));
        }
        if table.entries.is_empty() {
            None
        } else {
            Some(table)
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an effect name addresses a music mode.
    pub fn is_music_name(name: &str) -> bool {
        name.starts_with(MUSIC_PREFIX)
    }

    pub fn command_value(&self, name: &str) -> Option<Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| {
            json!({"musicMode": v, "sensitivity": DEFAULT_SENSITIVITY, "autoColor": 1})
        })
    }

    /// Reverse lookup from a raw `{musicMode, ...}` state value.
    pub fn resolve_value(&self, value: &Value) -> Option<&str> {
        let mode = value.get("musicMode").and_then(Value::as_i64)?;
        self.entries
            .iter()
            .find(|(_, v)| *v == mode)
            .map(|(n, _)| n.as_str())
    }
}

// ── Segment control ──────────────────────────────────────────────────

/// Which per-segment instances a light advertises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentCaps {
    pub rgb: bool,
    pub brightness: bool,
}

impl SegmentCaps {
    pub fn absorb(&mut self, cap: &Capability) {
        match cap.instance.as_str() {
            "segmentedColorRgb" => self.rgb = true,
            "segmentedBrightness" => self.brightness = true,
            other => warn!(instance = other, "unknown segment_color_setting instance"),
        }
    }

    pub fn any(&self) -> bool {
        self.rgb || self.brightness
    }
}

// ── Value codecs ─────────────────────────────────────────────────────

/// Pack an `(r, g, b)` triple into the 24-bit combined value the vendor
/// transmits.
pub fn rgb_to_value(r: u8, g: u8, b: u8) -> i64 {
    (i64::from(r) << 16) | (i64::from(g) << 8) | i64::from(b)
}

/// Unpack a combined 24-bit color value. Lossless inverse of
/// [`rgb_to_value`].
pub fn value_to_rgb(value: i64) -> (u8, u8, u8) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
    (
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    )
}

/// Map a 0-255 level onto the device's advertised range.
///
/// Integer arithmetic throughout: `min + (max - min) * level / 255`, so a
/// level of 128 over `1..=100` lands on 50.
pub fn scale_to_device(bounds: RangeBounds, level: u8) -> i64 {
    bounds.min + (bounds.max - bounds.min) * i64::from(level) / 255
}

/// Map a device-range value back onto 0-255. Inverse of
/// [`scale_to_device`], clamped to the valid range.
pub fn device_to_scale(bounds: RangeBounds, value: i64) -> u8 {
    let clamped = value.clamp(bounds.min, bounds.max);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
    {
        ((clamped - bounds.min) * 255 / (bounds.max - bounds.min)) as u8
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::CapabilityKind;
    use serde_json::json;

    fn cap(kind: CapabilityKind, instance: &str, parameters: Value) -> Capability {
        Capability {
            kind,
            instance: instance.into(),
            parameters: Some(parameters),
            state: None,
        }
    }

    // ── Power ────────────────────────────────────────────────────────

    #[test]
    fn power_table_maps_both_directions() {
        let capability = cap(
            CapabilityKind::OnOff,
            "powerSwitch",
            json!({"dataType": "ENUM", "options": [
                {"name": "on", "value": 1}, {"name": "off", "value": 0}]}),
        );
        let table = PowerTable::from_capability(&capability).unwrap();

        assert_eq!(table.raw(true), json!(1));
        assert_eq!(table.raw(false), json!(0));
        assert!(table.is_on(&json!(1)));
        assert!(!table.is_on(&json!(0)));
        assert!(!table.is_on(&json!(7)));
    }

    #[test]
    fn power_table_rejects_missing_options() {
        let capability = cap(
            CapabilityKind::OnOff,
            "powerSwitch",
            json!({"options": [{"name": "on", "value": 1}]}),
        );
        assert!(PowerTable::from_capability(&capability).is_none());
    }

    // ── Range ────────────────────────────────────────────────────────

    #[test]
    fn range_bounds_parse_and_contain() {
        let capability = cap(
            CapabilityKind::Range,
            "humidity",
            json!({"range": {"min": 30, "max": 80, "precision": 1}}),
        );
        let bounds = RangeBounds::from_capability(&capability).unwrap();
        assert_eq!(bounds, RangeBounds { min: 30, max: 80 });
        assert!(bounds.contains(30));
        assert!(bounds.contains(80));
        assert!(!bounds.contains(29));
        assert!(!bounds.contains(81));
    }

    #[test]
    fn degenerate_range_rejected() {
        let capability = cap(
            CapabilityKind::Range,
            "humidity",
            json!({"range": {"min": 80, "max": 30}}),
        );
        assert!(RangeBounds::from_capability(&capability).is_none());
    }

    // ── Work mode ────────────────────────────────────────────────────

    fn work_mode_cap() -> Capability {
        cap(
            CapabilityKind::WorkMode,
            "workMode",
            json!({"fields": [
                {"fieldName": "workMode", "dataType": "ENUM", "options": [
                    {"name": "gearMode", "value": 1},
                    {"name": "Auto", "value": 3},
                    {"name": "Custom", "value": 2}
                ]},
                {"fieldName": "modeValue", "dataType": "ENUM", "options": [
                    {"name": "gearMode", "options": [
                        {"name": "Low", "value": 1},
                        {"name": "Medium", "value": 2},
                        {"name": "High", "value": 3}
                    ]},
                    {"name": "Auto", "defaultValue": 0}
                ]}
            ]}),
        )
    }

    #[test]
    fn gear_modes_flatten_to_leaf_names() {
        let table = ModeTable::from_capability(&work_mode_cap()).unwrap();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["Low", "Medium", "High", "Auto", "Custom"]);

        assert_eq!(
            table.command_value("Medium").unwrap(),
            json!({"workMode": 1, "modeValue": 2})
        );
        assert_eq!(
            table.command_value("Auto").unwrap(),
            json!({"workMode": 3, "modeValue": 0})
        );
    }

    #[test]
    fn mode_round_trip_recovers_every_name() {
        let table = ModeTable::from_capability(&work_mode_cap()).unwrap();
        let names: Vec<String> = table.names().map(str::to_owned).collect();
        for name in names {
            let value = table.command_value(&name).unwrap();
            assert_eq!(table.resolve_value(&value), Some(name.as_str()));
        }
    }

    #[test]
    fn unmapped_mode_value_resolves_to_none() {
        let table = ModeTable::from_capability(&work_mode_cap()).unwrap();
        assert_eq!(table.resolve_value(&json!({"workMode": 9, "modeValue": 9})), None);
        assert_eq!(table.resolve_value(&json!({"bogus": true})), None);
    }

    #[test]
    fn missing_mode_value_reads_as_zero() {
        let table = ModeTable::from_capability(&work_mode_cap()).unwrap();
        assert_eq!(table.resolve_value(&json!({"workMode": 3})), Some("Auto"));
    }

    // ── Scenes ───────────────────────────────────────────────────────

    #[test]
    fn builtin_catalog_resolves_by_name_and_id() {
        let table = SceneTable::builtin();
        assert_eq!(
            table.command_value("Aurora").unwrap(),
            json!({"id": 201, "paramId": 182})
        );
        assert_eq!(table.resolve_id(201), Some("Aurora"));
        assert_eq!(table.resolve_id(-1), None);
    }

    #[test]
    fn fetched_scenes_replace_same_name_and_append_new() {
        let mut table = SceneTable::builtin();
        table.merge_capability(&cap(
            CapabilityKind::DynamicScene,
            "lightScene",
            json!({"options": [
                {"name": "Aurora", "value": {"id": 9001, "paramId": 9002}},
                {"name": "Candlelight", "value": {"id": 6114, "paramId": 4126}},
                {"name": "broken"}
            ]}),
        ));

        assert_eq!(
            table.command_value("Aurora").unwrap(),
            json!({"id": 9001, "paramId": 9002})
        );
        assert_eq!(table.resolve_id(6114), Some("Candlelight"));
    }

    // ── Music ────────────────────────────────────────────────────────

    #[test]
    fn music_modes_carry_defaults() {
        let capability = cap(
            CapabilityKind::MusicSetting,
            "musicMode",
            json!({"fields": [
                {"fieldName": "musicMode", "options": [
                    {"name": "Energic", "value": 1},
                    {"name": "Rhythm", "value": 2}
                ]},
                {"fieldName": "sensitivity", "dataType": "INTEGER"}
            ]}),
        );
        let table = MusicTable::from_capability(&capability).unwrap();

        assert_eq!(
            table.names().collect::<Vec<_>>(),
            vec!["Music: Energic", "Music: Rhythm"]
        );
        assert_eq!(
            table.command_value("Music: Rhythm").unwrap(),
            json!({"musicMode": 2, "sensitivity": 50, "autoColor": 1})
        );
        assert_eq!(
            table.resolve_value(&json!({"musicMode": 1, "sensitivity": 80})),
            Some("Music: Energic")
        );
    }

    // ── Codecs ───────────────────────────────────────────────────────

    #[test]
    fn rgb_round_trips_exactly() {
        assert_eq!(rgb_to_value(255, 0, 0), 16_711_680);
        assert_eq!(value_to_rgb(16_711_680), (255, 0, 0));
        for value in [0, 255, 65_280, 16_711_680, 16_777_215, 0x12_34_56] {
            let (r, g, b) = value_to_rgb(value);
            assert_eq!(rgb_to_value(r, g, b), value);
        }
    }

    #[test]
    fn level_128_over_1_to_100_is_50() {
        let bounds = RangeBounds { min: 1, max: 100 };
        assert_eq!(scale_to_device(bounds, 128), 50);
        assert_eq!(scale_to_device(bounds, 0), 1);
        assert_eq!(scale_to_device(bounds, 255), 100);
    }

    #[test]
    fn device_to_scale_clamps_out_of_range() {
        let bounds = RangeBounds { min: 1, max: 100 };
        assert_eq!(device_to_scale(bounds, 100), 255);
        assert_eq!(device_to_scale(bounds, 1), 0);
        assert_eq!(device_to_scale(bounds, 0), 0);
        assert_eq!(device_to_scale(bounds, 250), 255);
    }
}
