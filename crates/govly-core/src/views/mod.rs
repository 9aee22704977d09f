//! Per-category device views.
//!
//! One capability-set implementation per device category, composed over
//! the shared state cache: each view decodes its capability subset once at
//! construction, reads live values from the cache, and mutates remote
//! state through the hub's control path.

pub mod fan;
pub mod humidifier;
pub mod light;
pub mod sensor;

pub use fan::FanView;
pub use humidifier::HumidifierView;
pub use light::LightView;
pub use sensor::SensorView;

use serde_json::Value;

use govly_api::CapabilityCommand;

use crate::model::CapabilityKind;

/// Build one wire-level capability command.
pub(crate) fn command(kind: &CapabilityKind, instance: &str, value: Value) -> CapabilityCommand {
    CapabilityCommand {
        kind: kind.wire_name().to_owned(),
        instance: instance.to_owned(),
        value,
    }
}

/// Event/property flags arrive as booleans or 0/1 integers depending on
/// the firmware.
pub(crate) fn truthy(value: &Value) -> bool {
    value
        .as_bool()
        .or_else(|| value.as_i64().map(|n| n != 0))
        .unwrap_or(false)
}
