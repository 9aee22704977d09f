// ── Light view ──

use std::sync::Arc;

use serde_json::{Value, json};

use crate::caps::{
    ColorCaps, MusicTable, PowerTable, RangeBounds, SceneTable, SegmentCaps, device_to_scale,
    rgb_to_value, scale_to_device, value_to_rgb,
};
use crate::error::CoreError;
use crate::hub::Hub;
use crate::model::{CapabilityKind, Device, DeviceKind};

use super::command;

/// Options for a turn-on action. Every set field becomes one capability
/// command; the whole set is sent as a single control request.
#[derive(Debug, Clone, Default)]
pub struct TurnOn {
    /// Brightness on the 0-255 scale (converted to the device's range).
    pub brightness: Option<u8>,
    pub rgb: Option<(u8, u8, u8)>,
    pub color_temp_kelvin: Option<i64>,
    /// Scene name or `"Music: ..."` mode name.
    pub effect: Option<String>,
}

/// Capability-set view over a light device.
pub struct LightView {
    hub: Hub,
    device: Arc<Device>,
    power: PowerTable,
    brightness: Option<RangeBounds>,
    color: ColorCaps,
    scenes: SceneTable,
    music: MusicTable,
    segments: SegmentCaps,
}

impl LightView {
    pub(crate) fn new(hub: Hub, identifier: &str) -> Result<Self, CoreError> {
        let device = hub
            .device(identifier)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: identifier.to_owned(),
            })?;
        if device.kind != DeviceKind::Light {
            return Err(CoreError::Validation {
                message: format!("device {} is a {}, not a light", device.id, device.kind),
            });
        }

        let mut power = None;
        let mut brightness = None;
        let mut color = ColorCaps::default();
        let mut scenes = SceneTable::builtin();
        let mut music = MusicTable::default();
        let mut segments = SegmentCaps::default();

        for cap in &device.capabilities {
            match &cap.kind {
                CapabilityKind::OnOff if cap.instance == "powerSwitch" => {
                    power = PowerTable::from_capability(cap);
                }
                CapabilityKind::Range if cap.instance == "brightness" => {
                    brightness = RangeBounds::from_capability(cap);
                }
                CapabilityKind::ColorSetting => color.absorb(cap),
                CapabilityKind::DynamicScene if cap.instance == "lightScene" => {
                    scenes.merge_capability(cap);
                }
                CapabilityKind::MusicSetting if cap.instance == "musicMode" => {
                    music = MusicTable::from_capability(cap).unwrap_or_default();
                }
                CapabilityKind::SegmentColorSetting => segments.absorb(cap),
                _ => {}
            }
        }

        let power = power.ok_or(CoreError::CapabilityMissing {
            identifier: device.id.clone(),
            capability: "on_off",
        })?;

        Ok(Self {
            hub,
            device,
            power,
            brightness,
            color,
            scenes,
            music,
            segments,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn supports_rgb(&self) -> bool {
        self.color.rgb
    }

    pub fn color_temp_bounds(&self) -> Option<RangeBounds> {
        self.color.temperature
    }

    pub fn supports_segments(&self) -> bool {
        self.segments.any()
    }

    /// All addressable effect names: scenes, then music modes.
    pub fn effects(&self) -> Vec<String> {
        self.scenes
            .names()
            .chain(self.music.names())
            .map(str::to_owned)
            .collect()
    }

    // ── Cache-backed reads ───────────────────────────────────────────

    pub async fn is_on(&self) -> bool {
        self.hub
            .cache()
            .get(&self.device.id, &CapabilityKind::OnOff, "powerSwitch")
            .await
            .is_some_and(|v| self.power.is_on(&v))
    }

    /// Brightness on the 0-255 scale, if known.
    pub async fn brightness(&self) -> Option<u8> {
        let bounds = self.brightness?;
        let value = self
            .hub
            .cache()
            .get(&self.device.id, &CapabilityKind::Range, "brightness")
            .await?
            .as_i64()?;
        Some(device_to_scale(bounds, value))
    }

    pub async fn rgb(&self) -> Option<(u8, u8, u8)> {
        let value = self
            .hub
            .cache()
            .get(&self.device.id, &CapabilityKind::ColorSetting, "colorRgb")
            .await?
            .as_i64()?;
        Some(value_to_rgb(value))
    }

    pub async fn color_temp_kelvin(&self) -> Option<i64> {
        self.hub
            .cache()
            .get(&self.device.id, &CapabilityKind::ColorSetting, "colorTemperatureK")
            .await?
            .as_i64()
    }

    /// The active effect name: a dynamic scene if one is set, otherwise a
    /// music mode, otherwise `None`.
    pub async fn effect(&self) -> Option<String> {
        let scene = self
            .hub
            .cache()
            .get(&self.device.id, &CapabilityKind::DynamicScene, "lightScene")
            .await;
        if let Some(id) = scene.as_ref().and_then(|v| v.get("id")).and_then(Value::as_i64) {
            if let Some(name) = self.scenes.resolve_id(id) {
                return Some(name.to_owned());
            }
        }

        let mode = self
            .hub
            .cache()
            .get(&self.device.id, &CapabilityKind::MusicSetting, "musicMode")
            .await?;
        self.music.resolve_value(&mode).map(str::to_owned)
    }

    // ── Control ──────────────────────────────────────────────────────

    /// Turn the light on, optionally adjusting brightness / color / effect
    /// in the same request.
    pub async fn turn_on(&self, opts: TurnOn) -> Result<bool, CoreError> {
        let mut others = Vec::new();

        if let Some(level) = opts.brightness {
            let bounds = self.brightness.ok_or(CoreError::CapabilityMissing {
                identifier: self.device.id.clone(),
                capability: "range/brightness",
            })?;
            others.push(command(
                &CapabilityKind::Range,
                "brightness",
                json!(scale_to_device(bounds, level)),
            ));
        }

        if let Some(kelvin) = opts.color_temp_kelvin {
            if let Some(bounds) = self.color.temperature {
                if !bounds.contains(kelvin) {
                    return Err(CoreError::Validation {
                        message: format!(
                            "color temperature {kelvin}K outside advertised range {}..={}K",
                            bounds.min, bounds.max
                        ),
                    });
                }
            }
            others.push(command(
                &CapabilityKind::ColorSetting,
                "colorTemperatureK",
                json!(kelvin),
            ));
        }

        if let Some((r, g, b)) = opts.rgb {
            others.push(command(
                &CapabilityKind::ColorSetting,
                "colorRgb",
                json!(rgb_to_value(r, g, b)),
            ));
        }

        if let Some(ref effect) = opts.effect {
            others.push(self.effect_command(effect)?);
        }

        // The power command leads so the device is awake before any
        // adjustment lands; skipped when it is already on and the request
        // carries real work.
        let mut commands = Vec::new();
        if !self.is_on().await || others.is_empty() {
            commands.push(command(
                &CapabilityKind::OnOff,
                "powerSwitch",
                self.power.raw(true),
            ));
        }
        commands.extend(others);

        self.hub.control(&self.device.id, commands).await
    }

    pub async fn turn_off(&self) -> Result<bool, CoreError> {
        let off = command(&CapabilityKind::OnOff, "powerSwitch", self.power.raw(false));
        self.hub.control(&self.device.id, vec![off]).await
    }

    fn effect_command(&self, effect: &str) -> Result<govly_api::CapabilityCommand, CoreError> {
        if MusicTable::is_music_name(effect) {
            let value = self
                .music
                .command_value(effect)
                .ok_or_else(|| CoreError::Validation {
                    message: format!("unknown music mode: {effect}"),
                })?;
            return Ok(command(&CapabilityKind::MusicSetting, "musicMode", value));
        }
        let value = self
            .scenes
            .command_value(effect)
            .ok_or_else(|| CoreError::Validation {
                message: format!("unknown scene: {effect}"),
            })?;
        Ok(command(&CapabilityKind::DynamicScene, "lightScene", value))
    }

    /// Configure a music-reactive mode with explicit tuning.
    pub async fn set_music_mode(
        &self,
        mode: &str,
        sensitivity: Option<i64>,
        auto_color: Option<bool>,
        rgb: Option<(u8, u8, u8)>,
    ) -> Result<bool, CoreError> {
        let mut value = self
            .music
            .command_value(mode)
            .ok_or_else(|| CoreError::Validation {
                message: format!("unknown music mode: {mode}"),
            })?;
        if let Some(map) = value.as_object_mut() {
            if let Some(s) = sensitivity {
                map.insert("sensitivity".into(), json!(s));
            }
            if let Some(auto) = auto_color {
                map.insert("autoColor".into(), json!(i64::from(auto)));
            }
            if let Some((r, g, b)) = rgb {
                map.insert("rgb".into(), json!(rgb_to_value(r, g, b)));
            }
        }
        let cmd = command(&CapabilityKind::MusicSetting, "musicMode", value);
        self.hub.control(&self.device.id, vec![cmd]).await
    }

    // ── Segment control ──────────────────────────────────────────────

    /// Set the color of individual segments of an addressable light.
    pub async fn set_segment_rgb(
        &self,
        segments: &[i64],
        rgb: (u8, u8, u8),
    ) -> Result<bool, CoreError> {
        if !self.segments.rgb {
            return Err(CoreError::CapabilityMissing {
                identifier: self.device.id.clone(),
                capability: "segment_color_setting/segmentedColorRgb",
            });
        }
        let (r, g, b) = rgb;
        let cmd = command(
            &CapabilityKind::SegmentColorSetting,
            "segmentedColorRgb",
            json!({"segment": segments, "rgb": rgb_to_value(r, g, b)}),
        );
        self.hub.control(&self.device.id, vec![cmd]).await
    }

    /// Set the brightness of individual segments.
    pub async fn set_segment_brightness(
        &self,
        segments: &[i64],
        brightness: i64,
    ) -> Result<bool, CoreError> {
        if !self.segments.brightness {
            return Err(CoreError::CapabilityMissing {
                identifier: self.device.id.clone(),
                capability: "segment_color_setting/segmentedBrightness",
            });
        }
        let cmd = command(
            &CapabilityKind::SegmentColorSetting,
            "segmentedBrightness",
            json!({"segment": segments, "brightness": brightness}),
        );
        self.hub.control(&self.device.id, vec![cmd]).await
    }

    // ── Snapshots ────────────────────────────────────────────────────

    /// Save the light's current output as its snapshot.
    pub async fn save_snapshot(&self) -> Result<bool, CoreError> {
        let cmd = command(&CapabilityKind::DynamicScene, "snapshot", json!(1));
        self.hub.control(&self.device.id, vec![cmd]).await
    }

    /// Restore the previously saved snapshot.
    pub async fn restore_snapshot(&self) -> Result<bool, CoreError> {
        let cmd = command(&CapabilityKind::DynamicScene, "snapshot", json!(2));
        self.hub.control(&self.device.id, vec![cmd]).await
    }
}
