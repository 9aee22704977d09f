// ── Humidifier / dehumidifier view ──

use std::sync::Arc;

use serde_json::json;

use crate::caps::{ModeTable, PowerTable, RangeBounds};
use crate::error::CoreError;
use crate::hub::Hub;
use crate::model::{CapabilityKind, Device, DeviceKind};

use super::{command, truthy};

/// Default target-humidity bounds when the device doesn't advertise any.
const DEFAULT_HUMIDITY_BOUNDS: RangeBounds = RangeBounds { min: 30, max: 80 };

/// Capability-set view over a humidifier or dehumidifier.
pub struct HumidifierView {
    hub: Hub,
    device: Arc<Device>,
    power: PowerTable,
    modes: ModeTable,
    humidity: RangeBounds,
    water_events: bool,
}

impl HumidifierView {
    pub(crate) fn new(hub: Hub, identifier: &str) -> Result<Self, CoreError> {
        let device = hub
            .device(identifier)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: identifier.to_owned(),
            })?;
        if !matches!(device.kind, DeviceKind::Humidifier | DeviceKind::Dehumidifier) {
            return Err(CoreError::Validation {
                message: format!("device {} is a {}, not a humidifier", device.id, device.kind),
            });
        }

        let power = device
            .capability(&CapabilityKind::OnOff, "powerSwitch")
            .and_then(PowerTable::from_capability)
            .ok_or(CoreError::CapabilityMissing {
                identifier: device.id.clone(),
                capability: "on_off",
            })?;
        let modes = device
            .capability(&CapabilityKind::WorkMode, "workMode")
            .and_then(ModeTable::from_capability)
            .unwrap_or_default();
        let humidity = device
            .capability(&CapabilityKind::Range, "humidity")
            .and_then(RangeBounds::from_capability)
            .unwrap_or(DEFAULT_HUMIDITY_BOUNDS);
        let water_events = device
            .capability(&CapabilityKind::Event, "waterFullEvent")
            .is_some();

        Ok(Self {
            hub,
            device,
            power,
            modes,
            humidity,
            water_events,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn is_dehumidifier(&self) -> bool {
        self.device.kind == DeviceKind::Dehumidifier
    }

    pub fn humidity_bounds(&self) -> RangeBounds {
        self.humidity
    }

    pub fn modes(&self) -> Vec<String> {
        self.modes.names().map(str::to_owned).collect()
    }

    pub async fn is_on(&self) -> bool {
        self.hub
            .cache()
            .get(&self.device.id, &CapabilityKind::OnOff, "powerSwitch")
            .await
            .is_some_and(|v| self.power.is_on(&v))
    }

    pub async fn mode(&self) -> Option<String> {
        let value = self
            .hub
            .cache()
            .get(&self.device.id, &CapabilityKind::WorkMode, "workMode")
            .await?;
        self.modes.resolve_value(&value).map(str::to_owned)
    }

    pub async fn set_mode(&self, mode: &str) -> Result<bool, CoreError> {
        let value = self
            .modes
            .command_value(mode)
            .ok_or_else(|| CoreError::Validation {
                message: format!("unknown mode: {mode}"),
            })?;
        let cmd = command(&CapabilityKind::WorkMode, "workMode", value);
        self.hub.control(&self.device.id, vec![cmd]).await
    }

    /// The cached target-humidity setting, if known.
    pub async fn target_humidity(&self) -> Option<i64> {
        self.hub
            .cache()
            .get(&self.device.id, &CapabilityKind::Range, "humidity")
            .await?
            .as_i64()
    }

    /// Request a new target humidity.
    ///
    /// Values outside the device's advertised bounds are rejected here --
    /// no command is sent.
    pub async fn set_humidity(&self, humidity: i64) -> Result<bool, CoreError> {
        if !self.humidity.contains(humidity) {
            return Err(CoreError::Validation {
                message: format!(
                    "target humidity {humidity}% outside advertised range {}..={}%",
                    self.humidity.min, self.humidity.max
                ),
            });
        }
        let cmd = command(&CapabilityKind::Range, "humidity", json!(humidity));
        self.hub.control(&self.device.id, vec![cmd]).await
    }

    pub async fn turn_on(&self) -> Result<bool, CoreError> {
        let cmd = command(&CapabilityKind::OnOff, "powerSwitch", self.power.raw(true));
        self.hub.control(&self.device.id, vec![cmd]).await
    }

    pub async fn turn_off(&self) -> Result<bool, CoreError> {
        let cmd = command(&CapabilityKind::OnOff, "powerSwitch", self.power.raw(false));
        self.hub.control(&self.device.id, vec![cmd]).await
    }

    // ── Water-tank events ────────────────────────────────────────────

    /// Whether the device can report a full water tank at all.
    pub fn reports_water_full(&self) -> bool {
        self.water_events
    }

    /// Last-known water-tank state from the event overlay.
    ///
    /// Events write this as a flat attribute, not a capability entry --
    /// it is one of the two sanctioned update channels into the cache.
    pub async fn water_full(&self) -> bool {
        self.hub
            .cache()
            .attribute(&self.device.id, "waterFullEvent")
            .await
            .as_ref()
            .is_some_and(truthy)
    }

    /// Acknowledge the water-full alert on the device.
    pub async fn reset_water_alert(&self) -> Result<bool, CoreError> {
        let cmd = command(&CapabilityKind::Event, "waterFullEvent", json!(0));
        self.hub.control(&self.device.id, vec![cmd]).await
    }
}
