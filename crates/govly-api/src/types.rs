// Wire types for the Govee cloud OpenAPI.
//
// These mirror the vendor's JSON shapes exactly (camelCase, `type` field
// names). Capability payloads stay as raw `serde_json::Value` here --
// typed decoding into descriptors is govly-core's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Envelopes ────────────────────────────────────────────────────────

/// GET responses wrap their payload as `{ code, message, data }`.
#[derive(Debug, Deserialize)]
pub(crate) struct GetEnvelope<T> {
    #[serde(default)]
    #[allow(dead_code)]
    pub code: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    pub message: Option<String>,
    pub data: T,
}

/// POST responses carry `requestId` + `code`/`msg` alongside the payload.
#[derive(Debug, Deserialize)]
pub(crate) struct PostEnvelope<T> {
    #[serde(rename = "requestId", default)]
    #[allow(dead_code)]
    pub request_id: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub code: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    pub msg: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

/// A field that the vendor serializes as either a single object or an
/// array of objects (the `capability` field of control requests/responses).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    /// A single-element vec serializes as a bare object, anything else as
    /// an array -- matching what the vendor accepts and echoes back.
    fn from(mut items: Vec<T>) -> Self {
        if items.len() == 1 {
            Self::One(items.remove(0))
        } else {
            Self::Many(items)
        }
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// One capability descriptor as transmitted by the vendor.
///
/// `parameters` describes the capability's schema (option lists, range
/// bounds, field trees); `state` carries the last-known value in state
/// responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCapability {
    #[serde(rename = "type")]
    pub kind: String,
    pub instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

/// One device descriptor from `GET user/devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub device: String,
    pub sku: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(rename = "deviceName", default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<RawCapability>,
}

// ── Device state ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct DeviceRef<'a> {
    pub sku: &'a str,
    pub device: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct StateRequest<'a> {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub payload: DeviceRef<'a>,
}

/// Full state snapshot for one device from `POST device/state`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceStatePayload {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<RawCapability>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StateResponse {
    pub payload: DeviceStatePayload,
}

// ── Device control ───────────────────────────────────────────────────

/// One capability command: `{ type, instance, value }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityCommand {
    #[serde(rename = "type")]
    pub kind: String,
    pub instance: String,
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct ControlPayload<'a> {
    pub sku: &'a str,
    pub device: &'a str,
    pub capability: OneOrMany<CapabilityCommand>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ControlRequest<'a> {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub payload: ControlPayload<'a>,
}

/// The echoed capability value confirming a command was applied.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlEcho {
    #[serde(rename = "type")]
    pub kind: String,
    pub instance: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ControlResponse {
    #[serde(default)]
    pub capability: Option<OneOrMany<ControlEcho>>,
}

// ── Scenes ───────────────────────────────────────────────────────────

/// Scene capabilities for a SKU from `GET device/scenes`.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneListPayload {
    #[serde(default)]
    pub capabilities: Vec<RawCapability>,
}

// ── Event subscription ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct SubscribeRequest<'a> {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub payload: DeviceRef<'a>,
}
