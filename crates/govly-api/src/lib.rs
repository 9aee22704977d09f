//! Async Rust client for the Govee cloud OpenAPI.
//!
//! Wire-level request/response framing shared by the poll and control
//! paths: API-key header injection, request-id correlation, structured
//! error classification (401 / 429 / other), and a daily request counter
//! for user-visible diagnostics.
//!
//! Capability payloads are passed through as raw JSON -- `govly-core`
//! owns the typed capability model built on top of this crate.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use types::{
    CapabilityCommand, ControlEcho, DeviceEntry, DeviceStatePayload, OneOrMany, RawCapability,
    SceneListPayload,
};
