// ── State cache ──
//
// Per-device, per-(kind, instance) map of last-known capability values:
// the single source of truth read by every device view. Writers are the
// poll coordinator (full replace), the control path (per-capability patch
// after a confirmed echo), and event ingestion (field-level overlay).
//
// The three write paths are idempotent projections of the vendor's own
// state, so last-writer-wins at (kind, instance) granularity is safe and
// no cross-path lock ordering is needed beyond the map lock itself.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::model::{Capability, CapabilityKind};

/// Cached state for one device.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceSnapshot {
    /// Structured capability snapshots, as delivered by poll and control
    /// echoes.
    pub capabilities: Vec<Capability>,
    /// Flat field overlay written by event ingestion. Deliberately NOT
    /// unified with the capability list -- events are less structured
    /// (a water-full flag arrives as a bare boolean, not a capability).
    pub attributes: Map<String, Value>,
}

/// The integration instance's state cache.
///
/// Owned by the hub; views hold a shared reference and only read.
#[derive(Debug, Default)]
pub struct StateCache {
    devices: RwLock<HashMap<String, DeviceSnapshot>>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the device has any cached state at all.
    pub async fn contains(&self, device: &str) -> bool {
        self.devices.read().await.contains_key(device)
    }

    /// The value of the unique `(kind, instance)` capability, or `None`
    /// when the device, the capability, or its state is absent.
    pub async fn get(&self, device: &str, kind: &CapabilityKind, instance: &str) -> Option<Value> {
        let devices = self.devices.read().await;
        devices
            .get(device)?
            .capabilities
            .iter()
            .find(|c| c.matches(kind, instance))
            .and_then(Capability::value)
            .cloned()
    }

    /// Replace the device's whole capability snapshot (full poll refresh).
    ///
    /// The event-attribute overlay survives a replace -- poll data never
    /// carries those fields.
    pub async fn replace(&self, device: &str, capabilities: Vec<Capability>) {
        let mut devices = self.devices.write().await;
        devices.entry(device.to_owned()).or_default().capabilities = capabilities;
    }

    /// Insert or overwrite the one `(kind, instance)` entry, leaving every
    /// other capability untouched. Used by command-echo folding.
    pub async fn patch(&self, device: &str, kind: CapabilityKind, instance: &str, value: Value) {
        let mut devices = self.devices.write().await;
        let snapshot = devices.entry(device.to_owned()).or_default();
        let state = serde_json::json!({ "value": value });
        match snapshot
            .capabilities
            .iter_mut()
            .find(|c| c.matches(&kind, instance))
        {
            Some(cap) => cap.state = Some(state),
            None => snapshot.capabilities.push(Capability {
                kind,
                instance: instance.to_owned(),
                parameters: None,
                state: Some(state),
            }),
        }
    }

    /// Merge event fields into the device's attribute overlay.
    ///
    /// Field-level and idempotent: re-delivering the same event re-sets the
    /// same values and changes nothing else.
    pub async fn merge_event(&self, device: &str, fields: &Map<String, Value>) {
        let mut devices = self.devices.write().await;
        let snapshot = devices.entry(device.to_owned()).or_default();
        for (key, value) in fields {
            snapshot.attributes.insert(key.clone(), value.clone());
        }
    }

    /// Read one event-overlay attribute.
    pub async fn attribute(&self, device: &str, name: &str) -> Option<Value> {
        let devices = self.devices.read().await;
        devices.get(device)?.attributes.get(name).cloned()
    }

    /// Full snapshot of one device's cached state (diagnostics / output).
    pub async fn snapshot(&self, device: &str) -> Option<DeviceSnapshot> {
        self.devices.read().await.get(device).cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cap(kind: CapabilityKind, instance: &str, value: Value) -> Capability {
        Capability {
            kind,
            instance: instance.into(),
            parameters: None,
            state: Some(json!({ "value": value })),
        }
    }

    #[tokio::test]
    async fn get_after_replace_returns_matching_state_value() {
        let cache = StateCache::new();
        cache
            .replace("dev-1", vec![
                cap(CapabilityKind::OnOff, "powerSwitch", json!(1)),
                cap(CapabilityKind::Range, "brightness", json!(80)),
            ])
            .await;

        assert_eq!(
            cache.get("dev-1", &CapabilityKind::OnOff, "powerSwitch").await,
            Some(json!(1))
        );
        assert_eq!(
            cache.get("dev-1", &CapabilityKind::Range, "brightness").await,
            Some(json!(80))
        );
        // No match on either half of the key.
        assert_eq!(cache.get("dev-1", &CapabilityKind::Range, "humidity").await, None);
        assert_eq!(
            cache.get("dev-1", &CapabilityKind::OnOff, "brightness").await,
            None
        );
        // Unknown device.
        assert_eq!(cache.get("dev-2", &CapabilityKind::OnOff, "powerSwitch").await, None);
    }

    #[tokio::test]
    async fn get_falls_back_to_instance_named_state_field() {
        let cache = StateCache::new();
        cache
            .replace("dev-1", vec![Capability {
                kind: CapabilityKind::Property,
                instance: "filterLifeTime".into(),
                parameters: None,
                state: Some(json!({ "filterLifeTime": 87 })),
            }])
            .await;

        assert_eq!(
            cache
                .get("dev-1", &CapabilityKind::Property, "filterLifeTime")
                .await,
            Some(json!(87))
        );
    }

    #[tokio::test]
    async fn capability_without_state_reads_absent() {
        let cache = StateCache::new();
        cache
            .replace("dev-1", vec![Capability {
                kind: CapabilityKind::OnOff,
                instance: "powerSwitch".into(),
                parameters: Some(json!({"options": []})),
                state: None,
            }])
            .await;

        assert_eq!(cache.get("dev-1", &CapabilityKind::OnOff, "powerSwitch").await, None);
    }

    #[tokio::test]
    async fn patch_overwrites_only_the_matching_entry() {
        let cache = StateCache::new();
        cache
            .replace("dev-1", vec![
                cap(CapabilityKind::OnOff, "powerSwitch", json!(0)),
                cap(CapabilityKind::Range, "brightness", json!(10)),
            ])
            .await;

        cache
            .patch("dev-1", CapabilityKind::OnOff, "powerSwitch", json!(1))
            .await;

        assert_eq!(
            cache.get("dev-1", &CapabilityKind::OnOff, "powerSwitch").await,
            Some(json!(1))
        );
        assert_eq!(
            cache.get("dev-1", &CapabilityKind::Range, "brightness").await,
            Some(json!(10))
        );
        assert_eq!(cache.snapshot("dev-1").await.unwrap().capabilities.len(), 2);
    }

    #[tokio::test]
    async fn patch_appends_previously_unknown_capability() {
        let cache = StateCache::new();
        cache
            .replace("dev-1", vec![cap(CapabilityKind::OnOff, "powerSwitch", json!(1))])
            .await;

        cache
            .patch("dev-1", CapabilityKind::Range, "humidity", json!(45))
            .await;

        assert_eq!(
            cache.get("dev-1", &CapabilityKind::Range, "humidity").await,
            Some(json!(45))
        );
        assert_eq!(cache.snapshot("dev-1").await.unwrap().capabilities.len(), 2);
    }

    #[tokio::test]
    async fn replace_preserves_event_overlay() {
        let cache = StateCache::new();
        let mut fields = Map::new();
        fields.insert("waterFullEvent".into(), json!(1));
        cache.merge_event("dev-1", &fields).await;

        cache
            .replace("dev-1", vec![cap(CapabilityKind::OnOff, "powerSwitch", json!(1))])
            .await;

        assert_eq!(cache.attribute("dev-1", "waterFullEvent").await, Some(json!(1)));
    }

    #[tokio::test]
    async fn merge_event_is_idempotent() {
        let cache = StateCache::new();
        let mut fields = Map::new();
        fields.insert("waterFullEvent".into(), json!(1));

        cache.merge_event("dev-1", &fields).await;
        cache.merge_event("dev-1", &fields).await;

        let snapshot = cache.snapshot("dev-1").await.unwrap();
        assert_eq!(snapshot.attributes.len(), 1);
        assert_eq!(snapshot.attributes["waterFullEvent"], json!(1));
    }
}
