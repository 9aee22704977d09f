//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;

use govly_core::{Device, Hub};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Capabilities")]
    capabilities: usize,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone().unwrap_or_default(),
            sku: d.sku.clone(),
            kind: d.kind.to_string(),
            capabilities: d.capabilities.len(),
        }
    }
}

fn detail(d: &Arc<Device>) -> String {
    let mut lines = vec![
        format!("ID:    {}", d.id),
        format!("Name:  {}", d.name.as_deref().unwrap_or("-")),
        format!("SKU:   {}", d.sku),
        format!("Type:  {}", d.kind),
    ];
    lines.push(format!("Capabilities ({}):", d.capabilities.len()));
    for cap in &d.capabilities {
        lines.push(format!("  {} / {}", cap.kind, cap.instance));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(hub: &Hub, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let devices = hub.devices().to_vec();
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let found = hub.device(&device).ok_or_else(|| CliError::NotFound {
                resource_type: "device".into(),
                identifier: device.clone(),
                list_command: "devices list".into(),
            })?;
            let out = output::render_single(&global.output, &found, detail, |d| d.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Capabilities { device } => {
            let found = hub.device(&device).ok_or_else(|| CliError::NotFound {
                resource_type: "device".into(),
                identifier: device.clone(),
                list_command: "devices list".into(),
            })?;
            let out = output::render_single(
                &global.output,
                &found.capabilities,
                |caps| {
                    serde_json::to_string_pretty(caps)
                        .unwrap_or_else(|e| format!("<serialization failed: {e}>"))
                },
                |_| found.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
