// ── Fan / air purifier view ──

use std::sync::Arc;

use serde_json::json;

use crate::caps::{ModeTable, PowerTable};
use crate::error::CoreError;
use crate::hub::Hub;
use crate::model::{CapabilityKind, Device, DeviceKind};

use super::command;

/// Capability-set view over a fan or air purifier.
pub struct FanView {
    hub: Hub,
    device: Arc<Device>,
    power: PowerTable,
    modes: ModeTable,
}

impl FanView {
    pub(crate) fn new(hub: Hub, identifier: &str) -> Result<Self, CoreError> {
        let device = hub
            .device(identifier)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: identifier.to_owned(),
            })?;
        if !matches!(device.kind, DeviceKind::Fan | DeviceKind::AirPurifier) {
            return Err(CoreError::Validation {
                message: format!("device {} is a {}, not a fan", device.id, device.kind),
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

        Ok(Self {
            hub,
            device,
            power,
            modes,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Preset mode names, in schema order.
    pub fn preset_modes(&self) -> Vec<String> {
        self.modes.names().map(str::to_owned).collect()
    }

    pub async fn is_on(&self) -> bool {
        self.hub
            .cache()
            .get(&self.device.id, &CapabilityKind::OnOff, "powerSwitch")
            .await
            .is_some_and(|v| self.power.is_on(&v))
    }

    /// The active preset mode, reverse-resolved from the cached raw value.
    pub async fn preset_mode(&self) -> Option<String> {
        let value = self
            .hub
            .cache()
            .get(&self.device.id, &CapabilityKind::WorkMode, "workMode")
            .await?;
        self.modes.resolve_value(&value).map(str::to_owned)
    }

    /// Switch to a named preset mode. Unknown names are rejected before
    /// any request is sent.
    pub async fn set_preset_mode(&self, mode: &str) -> Result<bool, CoreError> {
        let value = self
            .modes
            .command_value(mode)
            .ok_or_else(|| CoreError::Validation {
                message: format!("unknown preset mode: {mode}"),
            })?;
        let cmd = command(&CapabilityKind::WorkMode, "workMode", value);
        self.hub.control(&self.device.id, vec![cmd]).await
    }

    /// Send a raw `{workMode, modeValue}` pair (device-specific custom
    /// programs outside the advertised schema).
    pub async fn set_custom_mode(&self, work_mode: i64, mode_value: i64) -> Result<bool, CoreError> {
        let cmd = command(
            &CapabilityKind::WorkMode,
            "workMode",
            json!({"workMode": work_mode, "modeValue": mode_value}),
        );
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

    // ── Diagnostic properties ────────────────────────────────────────

    /// Remaining filter life in percent, if the device reports it.
    pub async fn filter_life(&self) -> Option<i64> {
        self.hub
            .cache()
            .get(&self.device.id, &CapabilityKind::Property, "filterLifeTime")
            .await?
            .as_i64()
    }

    /// Current air quality index, if the device reports it.
    pub async fn air_quality(&self) -> Option<i64> {
        self.hub
            .cache()
            .get(&self.device.id, &CapabilityKind::Property, "airQuality")
            .await?
            .as_i64()
    }
}
