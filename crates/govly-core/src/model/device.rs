// ── Device domain types ──

use serde::{Deserialize, Serialize};

use govly_api::DeviceEntry;

use super::capability::{Capability, CapabilityKind};

/// Canonical device category -- normalized from `devices.types.*` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeviceKind {
    Light,
    Fan,
    AirPurifier,
    Humidifier,
    Dehumidifier,
    Heater,
    Kettle,
    Thermometer,
    Socket,
    /// Unrecognized device type, preserved verbatim.
    Other(String),
}

impl DeviceKind {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "devices.types.light" => Self::Light,
            "devices.types.fan" => Self::Fan,
            "devices.types.air_purifier" => Self::AirPurifier,
            "devices.types.humidifier" => Self::Humidifier,
            "devices.types.dehumidifier" => Self::Dehumidifier,
            "devices.types.heater" => Self::Heater,
            "devices.types.kettle" => Self::Kettle,
            "devices.types.thermometer" => Self::Thermometer,
            "devices.types.socket" => Self::Socket,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn wire_name(&self) -> &str {
        match self {
            Self::Light => "devices.types.light",
            Self::Fan => "devices.types.fan",
            Self::AirPurifier => "devices.types.air_purifier",
            Self::Humidifier => "devices.types.humidifier",
            Self::Dehumidifier => "devices.types.dehumidifier",
            Self::Heater => "devices.types.heater",
            Self::Kettle => "devices.types.kettle",
            Self::Thermometer => "devices.types.thermometer",
            Self::Socket => "devices.types.socket",
            Self::Other(s) => s,
        }
    }

    /// Short human label (the last dotted segment).
    pub fn label(&self) -> &str {
        self.wire_name().rsplit('.').next().unwrap_or("unknown")
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DeviceKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for DeviceKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&s))
    }
}

/// The canonical device type.
///
/// Built from the account's device listing at hub startup. The capability
/// list may be enriched once (scene merge for lights) before the poll
/// coordinators are built; it is immutable afterwards -- live values are
/// held by the state cache, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Opaque vendor device id (primary key).
    pub id: String,
    /// Model identifier.
    pub sku: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub name: Option<String>,
    pub capabilities: Vec<Capability>,
}

impl Device {
    /// Find the unique capability matching `(kind, instance)`.
    pub fn capability(&self, kind: &CapabilityKind, instance: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.matches(kind, instance))
    }

    /// All capabilities of a given kind.
    pub fn capabilities_of(&self, kind: &CapabilityKind) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter().filter(move |c| c.kind == *kind)
    }

    /// Whether the device advertises any capability of the given kind.
    pub fn has_capability(&self, kind: &CapabilityKind) -> bool {
        self.capabilities.iter().any(|c| c.kind == *kind)
    }

    /// Merge a fetched scene capability into the list, replacing any
    /// existing entry with the same `(kind, instance)` key and appending
    /// otherwise. Used once, during hub startup, for light devices.
    pub fn merge_capability(&mut self, incoming: Capability) {
        match self
            .capabilities
            .iter_mut()
            .find(|c| c.matches(&incoming.kind, &incoming.instance))
        {
            Some(existing) => *existing = incoming,
            None => self.capabilities.push(incoming),
        }
    }
}

impl From<DeviceEntry> for Device {
    fn from(entry: DeviceEntry) -> Self {
        Self {
            id: entry.device,
            sku: entry.sku,
            kind: DeviceKind::from_wire(&entry.device_type),
            name: entry.device_name,
            capabilities: entry.capabilities.into_iter().map(Capability::from).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene_cap(id: i64) -> Capability {
        Capability {
            kind: CapabilityKind::DynamicScene,
            instance: "lightScene".into(),
            parameters: Some(json!({"options": [{"name": "Aurora", "value": {"id": id}}]})),
            state: None,
        }
    }

    #[test]
    fn merge_replaces_same_instance_scene_entry() {
        let mut device = Device {
            id: "dev-1".into(),
            sku: "H6008".into(),
            kind: DeviceKind::Light,
            name: None,
            capabilities: vec![scene_cap(1)],
        };

        device.merge_capability(scene_cap(2));

        assert_eq!(device.capabilities.len(), 1);
        let params = device.capabilities[0].parameters.as_ref().unwrap();
        assert_eq!(params["options"][0]["value"]["id"], 2);
    }

    #[test]
    fn merge_appends_new_instance() {
        let mut device = Device {
            id: "dev-1".into(),
            sku: "H6008".into(),
            kind: DeviceKind::Light,
            name: None,
            capabilities: vec![],
        };

        device.merge_capability(scene_cap(1));
        assert_eq!(device.capabilities.len(), 1);
    }

    #[test]
    fn device_kind_label() {
        assert_eq!(DeviceKind::from_wire("devices.types.light").label(), "light");
        assert_eq!(
            DeviceKind::from_wire("devices.types.air_purifier").to_string(),
            "air_purifier"
        );
    }
}
