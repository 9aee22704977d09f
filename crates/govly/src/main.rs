//! govly — CLI for Govee cloud smart-home devices.

mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match run(cli).await {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

fn init_tracing(verbosity: u8) {
    let directive = match verbosity {
        0 => "govly=warn,govly_core=warn,govly_api=warn",
        1 => "govly=info,govly_core=info,govly_api=info",
        2 => "govly=debug,govly_core=debug,govly_api=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = cli.global;

    match cli.command {
        // Config commands never touch the network.
        Command::Config(args) => commands::config_cmd::handle(args, &global),

        Command::Serve(args) => {
            let hub = commands::resident_hub(&global).await?;
            commands::serve::handle(hub, args, global.quiet).await
        }

        // Everything else is a one-shot: connect, act, shut down.
        command => {
            let hub = commands::oneshot_hub(&global).await?;
            let result = match command {
                Command::Devices(args) => commands::devices::handle(&hub, args, &global),
                Command::State(args) => commands::state::handle(&hub, args, &global).await,
                Command::Light(args) => commands::light::handle(&hub, args, &global).await,
                Command::Fan(args) => commands::fan::handle(&hub, args, &global).await,
                Command::Humidifier(args) => {
                    commands::humidifier::handle(&hub, args, &global).await
                }
                Command::Scenes { device } => {
                    commands::light::handle_scenes(&hub, &device, &global)
                }
                Command::Config(_) | Command::Serve(_) => unreachable!("handled above"),
            };
            hub.shutdown().await;
            result
        }
    }
}
