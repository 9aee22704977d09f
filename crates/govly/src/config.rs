//! CLI configuration — thin wrapper around `govly_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-key, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use govly_core::HubConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use govly_config::{Config, config_path, load_config_or_default};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate config + global flags into a `HubConfig`.
///
/// CLI flag overrides take priority over profile values. A missing
/// profile is fine when the key comes from a flag or the environment.
pub fn resolve_hub_config(global: &GlobalOpts, config: &Config) -> Result<HubConfig, CliError> {
    let profile_name = active_profile_name(global, config);
    let default_profile = govly_config::Profile::default();
    let profile = config
        .profiles
        .get(&profile_name)
        .unwrap_or(&default_profile);

    let mut hub_config = if let Some(ref key) = global.api_key {
        // Flag/env key bypasses the credential chain entirely.
        let mut cfg = HubConfig::new(SecretString::from(key.clone()));
        if let Some(ref base_url) = profile.base_url {
            cfg.base_url.clone_from(base_url);
        }
        cfg.poll_interval = Duration::from_secs(
            profile.poll_interval.unwrap_or(config.defaults.poll_interval),
        );
        cfg.timeout = Duration::from_secs(profile.timeout.unwrap_or(config.defaults.timeout));
        cfg
    } else {
        govly_config::profile_to_hub_config(config, profile, &profile_name)?
    };

    if let Some(timeout) = global.timeout {
        hub_config.timeout = Duration::from_secs(timeout);
    }

    Ok(hub_config)
}
