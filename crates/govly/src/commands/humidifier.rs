//! Humidifier / dehumidifier command handlers.

use govly_core::Hub;

use crate::cli::{GlobalOpts, HumidifierArgs, HumidifierCommand};
use crate::error::CliError;
use crate::output;

use super::finish_control;

pub async fn handle(hub: &Hub, args: HumidifierArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        HumidifierCommand::On { device } => {
            let humidifier = hub.humidifier(&device)?;
            finish_control(humidifier.turn_on().await?, global.quiet)
        }

        HumidifierCommand::Off { device } => {
            let humidifier = hub.humidifier(&device)?;
            finish_control(humidifier.turn_off().await?, global.quiet)
        }

        HumidifierCommand::Mode { device, mode } => {
            let humidifier = hub.humidifier(&device)?;
            match mode {
                Some(mode) => finish_control(humidifier.set_mode(&mode).await?, global.quiet),
                None => {
                    let current = humidifier.mode().await;
                    let mut lines = Vec::new();
                    for name in humidifier.modes() {
                        let marker = if current.as_deref() == Some(name.as_str()) {
                            "*"
                        } else {
                            " "
                        };
                        lines.push(format!("{marker} {name}"));
                    }
                    if humidifier.water_full().await {
                        lines.push("  (water tank full)".into());
                    }
                    output::print_output(&lines.join("\n"), global.quiet);
                    Ok(())
                }
            }
        }

        HumidifierCommand::Humidity { device, percent } => {
            let humidifier = hub.humidifier(&device)?;
            finish_control(humidifier.set_humidity(percent).await?, global.quiet)
        }

        HumidifierCommand::ResetWaterAlert { device } => {
            let humidifier = hub.humidifier(&device)?;
            finish_control(humidifier.reset_water_alert().await?, global.quiet)
        }
    }
}
