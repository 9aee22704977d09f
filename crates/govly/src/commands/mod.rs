//! Command handlers.

pub mod config_cmd;
pub mod devices;
pub mod fan;
pub mod humidifier;
pub mod light;
pub mod serve;
pub mod state;

use std::time::Duration;

use govly_core::Hub;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Connect a hub for a single request-response cycle: polling disabled,
/// shut down by the caller when the command finishes.
pub async fn oneshot_hub(global: &GlobalOpts) -> Result<Hub, CliError> {
    let config = crate::config::load_config_or_default();
    let mut hub_config = crate::config::resolve_hub_config(global, &config)?;
    hub_config.poll_interval = Duration::ZERO;
    Ok(Hub::connect(hub_config).await?)
}

/// Connect a hub with the configured poll cadence (for `serve`).
pub async fn resident_hub(global: &GlobalOpts) -> Result<Hub, CliError> {
    let config = crate::config::load_config_or_default();
    let hub_config = crate::config::resolve_hub_config(global, &config)?;
    Ok(Hub::connect(hub_config).await?)
}

/// Translate a control outcome into output + exit status.
pub fn finish_control(ok: bool, quiet: bool) -> Result<(), CliError> {
    if ok {
        if !quiet {
            eprintln!("OK");
        }
        Ok(())
    } else {
        Err(CliError::Validation(
            "control command failed (the cloud returned no confirmation echo)".into(),
        ))
    }
}
