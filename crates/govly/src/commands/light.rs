//! Light command handlers.

use govly_core::{Hub, TurnOn};

use crate::cli::{GlobalOpts, LightArgs, LightCommand, Rgb};
use crate::error::CliError;
use crate::output;

use super::finish_control;

#[allow(clippy::too_many_lines)]
pub async fn handle(hub: &Hub, args: LightArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        LightCommand::On {
            device,
            brightness,
            color,
            color_temp,
            effect,
        } => {
            let light = hub.light(&device)?;
            let ok = light
                .turn_on(TurnOn {
                    brightness,
                    rgb: color.map(|Rgb(r, g, b)| (r, g, b)),
                    color_temp_kelvin: color_temp,
                    effect,
                })
                .await?;
            finish_control(ok, global.quiet)
        }

        LightCommand::Off { device } => {
            let light = hub.light(&device)?;
            finish_control(light.turn_off().await?, global.quiet)
        }

        LightCommand::Scene { device, name } => {
            let light = hub.light(&device)?;
            let ok = light
                .turn_on(TurnOn {
                    effect: Some(name),
                    ..TurnOn::default()
                })
                .await?;
            finish_control(ok, global.quiet)
        }

        LightCommand::Music {
            device,
            mode,
            sensitivity,
            no_auto_color,
            color,
        } => {
            let light = hub.light(&device)?;
            let auto_color = no_auto_color.then_some(false);
            let ok = light
                .set_music_mode(
                    &mode,
                    sensitivity,
                    auto_color,
                    color.map(|Rgb(r, g, b)| (r, g, b)),
                )
                .await?;
            finish_control(ok, global.quiet)
        }

        LightCommand::Segment {
            device,
            segments,
            color,
            brightness,
        } => {
            let light = hub.light(&device)?;
            let ok = match (color, brightness) {
                (Some(Rgb(r, g, b)), None) => {
                    light.set_segment_rgb(&segments, (r, g, b)).await?
                }
                (None, Some(level)) => light.set_segment_brightness(&segments, level).await?,
                _ => {
                    return Err(CliError::Validation(
                        "segment control needs exactly one of --color or --brightness".into(),
                    ));
                }
            };
            finish_control(ok, global.quiet)
        }

        LightCommand::SaveSnapshot { device } => {
            let light = hub.light(&device)?;
            finish_control(light.save_snapshot().await?, global.quiet)
        }

        LightCommand::RestoreSnapshot { device } => {
            let light = hub.light(&device)?;
            finish_control(light.restore_snapshot().await?, global.quiet)
        }
    }
}

/// `govly scenes <device>` — list every addressable effect.
pub fn handle_scenes(hub: &Hub, device: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let light = hub.light(device)?;
    let effects = light.effects();
    let out = effects.join("\n");
    output::print_output(&out, global.quiet);
    Ok(())
}
