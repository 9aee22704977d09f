//! Canonical domain types: devices and their capabilities.

pub mod capability;
pub mod device;

pub use capability::{Capability, CapabilityKind};
pub use device::{Device, DeviceKind};
