// ── Sensor view ──
//
// Read-only view over a device's reported properties and event flags.
// Works for any device kind: which sensors exist follows from the
// capability list, not the category.

use std::sync::Arc;

use serde_json::Value;

use crate::error::CoreError;
use crate::hub::Hub;
use crate::model::{CapabilityKind, Device};

use super::truthy;

/// Read-only sensor accessors composed over the state cache.
pub struct SensorView {
    hub: Hub,
    device: Arc<Device>,
    properties: Vec<String>,
    water_events: bool,
}

impl SensorView {
    pub(crate) fn new(hub: Hub, identifier: &str) -> Result<Self, CoreError> {
        let device = hub
            .device(identifier)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: identifier.to_owned(),
            })?;

        let properties = device
            .capabilities_of(&CapabilityKind::Property)
            .map(|c| c.instance.clone())
            .collect();
        let water_events = device
            .capability(&CapabilityKind::Event, "waterFullEvent")
            .is_some();

        Ok(Self {
            hub,
            device,
            properties,
            water_events,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Property instances the device advertises (e.g. `filterLifeTime`,
    /// `airQuality`).
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn has_water_sensor(&self) -> bool {
        self.water_events
    }

    /// Read one property's cached value by instance name.
    pub async fn property(&self, instance: &str) -> Option<Value> {
        self.hub
            .cache()
            .get(&self.device.id, &CapabilityKind::Property, instance)
            .await
    }

    /// Remaining filter life in percent.
    pub async fn filter_life(&self) -> Option<i64> {
        self.property("filterLifeTime").await?.as_i64()
    }

    /// Air quality index.
    pub async fn air_quality(&self) -> Option<i64> {
        self.property("airQuality").await?.as_i64()
    }

    /// Water-tank-full flag from the event overlay.
    pub async fn water_full(&self) -> bool {
        self.hub
            .cache()
            .attribute(&self.device.id, "waterFullEvent")
            .await
            .as_ref()
            .is_some_and(truthy)
    }
}
