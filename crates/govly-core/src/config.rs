// ── Runtime hub configuration ──
//
// Describes *how* to talk to the vendor cloud. Carries the credential and
// connection tuning, but never touches disk -- the CLI (via govly-config)
// constructs a `HubConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;

/// Configuration for one hub instance (one account / API key).
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Cloud API base URL.
    pub base_url: String,
    /// The account's API key, sent as a fixed header on every request.
    pub api_key: SecretString,
    /// Interval between full state refreshes per device. Zero disables
    /// the scheduled loops (one-shot use).
    pub poll_interval: Duration,
    /// Per-request timeout handed to the API client.
    pub timeout: Duration,
}

impl HubConfig {
    /// Build a config with the vendor's documented defaults
    /// (60 s poll interval, 10 s request timeout).
    pub fn new(api_key: SecretString) -> Self {
        Self {
            base_url: govly_api::DEFAULT_BASE_URL.to_owned(),
            api_key,
            poll_interval: Duration::from_secs(60),
            timeout: Duration::from_secs(10),
        }
    }
}
