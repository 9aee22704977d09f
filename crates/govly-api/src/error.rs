use thiserror::Error;

/// Top-level error type for the `govly-api` crate.
///
/// Every failure mode of the cloud API surfaces here with enough structure
/// for callers to apply policy: setup paths escalate `Unauthenticated` to a
/// fatal reconfiguration condition, poll/control paths degrade to a failed
/// cycle. `govly-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication / quota ──────────────────────────────────────
    /// API key rejected (HTTP 401).
    #[error("Unauthenticated: API key rejected by the cloud")]
    Unauthenticated,

    /// Daily request quota exhausted (HTTP 429). The vendor enforces the
    /// quota remotely; this is never retried inline.
    #[error("Rate limited by the cloud API (daily account quota)")]
    RateLimited,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── API ─────────────────────────────────────────────────────────
    /// Any other non-2xx response from the cloud.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means the API key needs reconfiguration.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    /// Returns `true` if this is the soft daily-quota failure.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Returns `true` if this is a transient error that the next scheduled
    /// poll cycle may clear on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited => true,
            _ => false,
        }
    }
}
