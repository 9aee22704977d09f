//! Fan / air purifier command handlers.

use govly_core::Hub;

use crate::cli::{FanArgs, FanCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::finish_control;

pub async fn handle(hub: &Hub, args: FanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        FanCommand::On { device } => {
            let fan = hub.fan(&device)?;
            finish_control(fan.turn_on().await?, global.quiet)
        }

        FanCommand::Off { device } => {
            let fan = hub.fan(&device)?;
            finish_control(fan.turn_off().await?, global.quiet)
        }

        FanCommand::Mode { device, mode } => {
            let fan = hub.fan(&device)?;
            match mode {
                Some(mode) => finish_control(fan.set_preset_mode(&mode).await?, global.quiet),
                None => {
                    let current = fan.preset_mode().await;
                    let mut lines = Vec::new();
                    for name in fan.preset_modes() {
                        let marker = if current.as_deref() == Some(name.as_str()) {
                            "*"
                        } else {
                            " "
                        };
                        lines.push(format!("{marker} {name}"));
                    }
                    if current.is_none() {
                        lines.push("  (current mode: unknown)".into());
                    }
                    output::print_output(&lines.join("\n"), global.quiet);
                    Ok(())
                }
            }
        }

        FanCommand::CustomMode {
            device,
            work_mode,
            mode_value,
        } => {
            let fan = hub.fan(&device)?;
            finish_control(fan.set_custom_mode(work_mode, mode_value).await?, global.quiet)
        }
    }
}
