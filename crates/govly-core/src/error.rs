// ── Core error types ──
//
// User-facing errors from govly-core. Consumers never see HTTP status
// codes or JSON parse failures directly -- the `From<govly_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection / auth ────────────────────────────────────────────
    /// The cloud rejected the API key. Terminal for the hub instance --
    /// requires reconfiguration, never silently retried.
    #[error("Authentication required: the cloud rejected the API key")]
    AuthenticationRequired,

    #[error("Cannot reach the cloud API: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Rate limited by the cloud (daily account quota)")]
    RateLimited,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Device {identifier} has no {capability} capability")]
    CapabilityMissing {
        identifier: String,
        capability: &'static str,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Control command failed: {message}")]
    ControlFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<govly_api::Error> for CoreError {
    fn from(err: govly_api::Error) -> Self {
        match err {
            govly_api::Error::Unauthenticated => CoreError::AuthenticationRequired,
            govly_api::Error::RateLimited => CoreError::RateLimited,
            govly_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            govly_api::Error::InvalidUrl(e) => CoreError::Internal(format!("invalid URL: {e}")),
            govly_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            govly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
