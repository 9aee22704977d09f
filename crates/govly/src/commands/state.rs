//! State command handler: show one device's cached capability snapshot.

use owo_colors::OwoColorize;

use govly_core::{DeviceSnapshot, Hub};

use crate::cli::{GlobalOpts, StateArgs};
use crate::error::CliError;
use crate::output;

fn detail(snapshot: &DeviceSnapshot, color: bool) -> String {
    let mut lines = Vec::new();
    for cap in &snapshot.capabilities {
        let value = cap
            .value()
            .map_or_else(|| "-".into(), std::string::ToString::to_string);
        let rendered = if color && cap.instance == "powerSwitch" {
            match value.as_str() {
                "1" => value.green().to_string(),
                "0" => value.red().to_string(),
                _ => value,
            }
        } else {
            value
        };
        lines.push(format!("{} / {}: {rendered}", cap.kind, cap.instance));
    }
    if !snapshot.attributes.is_empty() {
        lines.push("attributes:".into());
        for (key, value) in &snapshot.attributes {
            lines.push(format!("  {key}: {value}"));
        }
    }
    lines.join("\n")
}

pub async fn handle(hub: &Hub, args: StateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.refresh {
        hub.refresh(&args.device).await?;
    }

    let device = hub.device(&args.device).ok_or_else(|| CliError::NotFound {
        resource_type: "device".into(),
        identifier: args.device.clone(),
        list_command: "devices list".into(),
    })?;

    let snapshot = hub
        .cache()
        .snapshot(&device.id)
        .await
        .unwrap_or_default();

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &snapshot,
        |s| detail(s, color),
        |_| device.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
