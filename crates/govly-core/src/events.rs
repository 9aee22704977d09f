// ── Hub event bus ──
//
// Typed, device-scoped notifications fanned out over a broadcast channel.
// Subscribers filter by device id; a lagging subscriber only loses its own
// backlog.

use serde_json::{Map, Value};

/// Notifications published by the hub.
#[derive(Debug, Clone)]
pub enum HubEvent {
    /// A full state refresh for the device landed in the cache.
    StateUpdated { device: String },

    /// A scheduled poll cycle failed; previously cached state is still
    /// visible and the next interval will retry.
    PollFailed { device: String, error: String },

    /// An inbound push event for the device.
    ///
    /// Carries the raw event fields. The same event value may be delivered
    /// more than once -- consumers needing exactly-once must deduplicate.
    Device {
        device: String,
        fields: Map<String, Value>,
    },
}

impl HubEvent {
    /// The device this event is scoped to.
    pub fn device(&self) -> &str {
        match self {
            Self::StateUpdated { device }
            | Self::PollFailed { device, .. }
            | Self::Device { device, .. } => device,
        }
    }
}
