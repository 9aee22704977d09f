//! Capability model and state-synchronization core between `govly-api`
//! and consumers (CLI / embedding applications).
//!
//! This crate owns the typed capability model, the per-device state
//! cache, and the synchronization machinery around the vendor cloud:
//!
//! - **[`Hub`]** — Explicit integration context managing the full
//!   lifecycle: [`connect()`](Hub::connect) fetches the device listing and
//!   each device's initial state, enriches light scene catalogs, subscribes
//!   event-capable devices to push notifications, then spawns one poll
//!   coordinator per device.
//!
//! - **[`StateCache`]** — Per-device, per-`(kind, instance)` map of
//!   last-known capability values: the single source of truth read by all
//!   device views. Written only by poll refreshes (full replace), control
//!   echoes (single-capability patch), and event ingestion (field overlay).
//!
//! - **Capability descriptors** ([`caps`]) — typed decodings of the
//!   vendor's heterogeneous capability schema: on/off tables, range
//!   bounds, color capabilities, hierarchical work-mode tables, scene and
//!   music-mode catalogs, segment flags.
//!
//! - **Device views** ([`views`]) — one capability-set implementation per
//!   device category (light, fan, humidifier, sensors), composed over the
//!   shared cache rather than inherited from a common entity base.
//!
//! - **[`HubEvent`]** — typed, device-scoped notifications over a
//!   broadcast channel; subscribers filter by device id.

pub mod cache;
pub mod caps;
pub mod config;
pub mod error;
pub mod events;
pub mod hub;
pub mod model;
pub mod poll;
mod scenes;
pub mod views;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{DeviceSnapshot, StateCache};
pub use caps::{
    ColorCaps, ModeTable, ModeValue, MusicTable, PowerTable, RangeBounds, SceneRef, SceneTable,
    SegmentCaps,
};
pub use config::HubConfig;
pub use error::CoreError;
pub use events::HubEvent;
pub use hub::Hub;
pub use model::{Capability, CapabilityKind, Device, DeviceKind};
pub use poll::PollState;
pub use views::{FanView, HumidifierView, LightView, SensorView, light::TurnOn};
