// ── Capability domain types ──
//
// A capability is one controllable or observable device function,
// identified by its `(kind, instance)` pair -- unique within a device.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use govly_api::RawCapability;

/// Broad capability category, normalized from the vendor's
/// `devices.capabilities.*` type strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CapabilityKind {
    OnOff,
    Toggle,
    Range,
    Mode,
    ColorSetting,
    WorkMode,
    DynamicScene,
    MusicSetting,
    SegmentColorSetting,
    Event,
    Property,
    Online,
    /// Unrecognized capability type, preserved verbatim.
    Other(String),
}

impl CapabilityKind {
    /// Parse a vendor type string (e.g. `"devices.capabilities.on_off"`).
    pub fn from_wire(s: &str) -> Self {
        match s {
            "devices.capabilities.on_off" => Self::OnOff,
            "devices.capabilities.toggle" => Self::Toggle,
            "devices.capabilities.range" => Self::Range,
            "devices.capabilities.mode" => Self::Mode,
            "devices.capabilities.color_setting" => Self::ColorSetting,
            "devices.capabilities.work_mode" => Self::WorkMode,
            "devices.capabilities.dynamic_scene" => Self::DynamicScene,
            "devices.capabilities.music_setting" => Self::MusicSetting,
            "devices.capabilities.segment_color_setting" => Self::SegmentColorSetting,
            "devices.capabilities.event" => Self::Event,
            "devices.capabilities.property" => Self::Property,
            "devices.capabilities.online" => Self::Online,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The vendor type string for this kind.
    pub fn wire_name(&self) -> &str {
        match self {
            Self::OnOff => "devices.capabilities.on_off",
            Self::Toggle => "devices.capabilities.toggle",
            Self::Range => "devices.capabilities.range",
            Self::Mode => "devices.capabilities.mode",
            Self::ColorSetting => "devices.capabilities.color_setting",
            Self::WorkMode => "devices.capabilities.work_mode",
            Self::DynamicScene => "devices.capabilities.dynamic_scene",
            Self::MusicSetting => "devices.capabilities.music_setting",
            Self::SegmentColorSetting => "devices.capabilities.segment_color_setting",
            Self::Event => "devices.capabilities.event",
            Self::Property => "devices.capabilities.property",
            Self::Online => "devices.capabilities.online",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl Serialize for CapabilityKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for CapabilityKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&s))
    }
}

/// One capability of a device: `(kind, instance)` plus the schema payload
/// and the last-known state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    #[serde(rename = "type")]
    pub kind: CapabilityKind,
    pub instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

impl Capability {
    /// Whether this capability matches a `(kind, instance)` key.
    pub fn matches(&self, kind: &CapabilityKind, instance: &str) -> bool {
        self.kind == *kind && self.instance == instance
    }

    /// The current value, if any.
    ///
    /// Reads `state.value`, falling back to a field named after the
    /// instance inside `state` (a legacy shape some firmwares emit).
    pub fn value(&self) -> Option<&Value> {
        let state = self.state.as_ref()?;
        state.get("value").or_else(|| state.get(&self.instance))
    }
}

impl From<RawCapability> for Capability {
    fn from(raw: RawCapability) -> Self {
        Self {
            kind: CapabilityKind::from_wire(&raw.kind),
            instance: raw.instance,
            parameters: raw.parameters,
            state: raw.state,
        }
    }
}
