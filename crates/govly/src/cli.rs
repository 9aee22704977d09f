//! Clap derive structures for the `govly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// govly -- control Govee cloud smart-home devices from the command line
#[derive(Debug, Parser)]
#[command(
    name = "govly",
    version,
    about = "Manage Govee cloud devices from the command line",
    long_about = "A CLI for Govee's cloud OpenAPI: list devices, inspect \n\
        capability state, and send control commands (power, brightness, \n\
        color, scenes, work modes, humidity).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "GOVLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API key (overrides profile)
    #[arg(long, env = "GOVEE_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GOVLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "GOVLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and inspect account devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Show a device's cached or freshly fetched capability state
    State(StateArgs),

    /// Control a light (power, brightness, color, effects, segments)
    #[command(alias = "l")]
    Light(LightArgs),

    /// Control a fan or air purifier
    Fan(FanArgs),

    /// Control a humidifier or dehumidifier
    #[command(alias = "humid")]
    Humidifier(HumidifierArgs),

    /// List the effects available for a light
    Scenes {
        /// Device id or name
        device: String,
    },

    /// Run resident: poll devices and receive event webhooks
    Serve(ServeArgs),

    /// Manage the config file and stored credentials
    Config(ConfigArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List all devices bound to the account
    #[command(alias = "ls")]
    List,

    /// Show one device in detail
    Get {
        /// Device id or name
        device: String,
    },

    /// Dump a device's raw capability descriptors
    #[command(alias = "caps")]
    Capabilities {
        /// Device id or name
        device: String,
    },
}

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StateArgs {
    /// Device id or name
    pub device: String,

    /// Fetch fresh state from the cloud instead of printing the baseline
    #[arg(long, short = 'r')]
    pub refresh: bool,
}

// ── Light ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightArgs {
    #[command(subcommand)]
    pub command: LightCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightCommand {
    /// Turn on, optionally adjusting output in the same request
    On {
        /// Device id or name
        device: String,

        /// Brightness 0-255
        #[arg(long, short = 'b')]
        brightness: Option<u8>,

        /// RGB color as R,G,B (e.g. 255,0,0)
        #[arg(long, short = 'c', value_parser = parse_rgb)]
        color: Option<Rgb>,

        /// Color temperature in Kelvin
        #[arg(long, short = 'k')]
        color_temp: Option<i64>,

        /// Scene or "Music: ..." effect name
        #[arg(long, short = 'e')]
        effect: Option<String>,
    },

    /// Turn off
    Off {
        /// Device id or name
        device: String,
    },

    /// Activate a dynamic scene by name
    Scene {
        /// Device id or name
        device: String,
        /// Scene name (see `govly scenes`)
        name: String,
    },

    /// Configure a music-reactive mode
    Music {
        /// Device id or name
        device: String,
        /// Music mode name (e.g. "Music: Rhythm")
        mode: String,
        /// Microphone sensitivity 0-100
        #[arg(long)]
        sensitivity: Option<i64>,
        /// Disable automatic coloring
        #[arg(long)]
        no_auto_color: bool,
        /// Fixed RGB color as R,G,B
        #[arg(long, value_parser = parse_rgb)]
        color: Option<Rgb>,
    },

    /// Control individual segments of an addressable light
    Segment {
        /// Device id or name
        device: String,
        /// Segment indexes, comma separated (e.g. 0,1,5)
        #[arg(long, short = 's', value_delimiter = ',', required = true)]
        segments: Vec<i64>,
        /// RGB color as R,G,B
        #[arg(long, short = 'c', value_parser = parse_rgb)]
        color: Option<Rgb>,
        /// Segment brightness (device range)
        #[arg(long, short = 'b')]
        brightness: Option<i64>,
    },

    /// Save the current output as the light's snapshot
    SaveSnapshot {
        /// Device id or name
        device: String,
    },

    /// Restore the previously saved snapshot
    RestoreSnapshot {
        /// Device id or name
        device: String,
    },
}

// ── Fan ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FanArgs {
    #[command(subcommand)]
    pub command: FanCommand,
}

#[derive(Debug, Subcommand)]
pub enum FanCommand {
    /// Turn on
    On { device: String },
    /// Turn off
    Off { device: String },
    /// List preset modes, or switch to one
    Mode {
        device: String,
        /// Preset mode name; omit to list the available modes
        mode: Option<String>,
    },
    /// Send a raw {workMode, modeValue} pair
    CustomMode {
        device: String,
        work_mode: i64,
        mode_value: i64,
    },
}

// ── Humidifier ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HumidifierArgs {
    #[command(subcommand)]
    pub command: HumidifierCommand,
}

#[derive(Debug, Subcommand)]
pub enum HumidifierCommand {
    /// Turn on
    On { device: String },
    /// Turn off
    Off { device: String },
    /// List modes, or switch to one
    Mode {
        device: String,
        /// Mode name; omit to list the available modes
        mode: Option<String>,
    },
    /// Set the target humidity percentage
    Humidity { device: String, percent: i64 },
    /// Acknowledge the water-full alert
    ResetWaterAlert { device: String },
}

// ── Serve ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address for the inbound event webhook listener
    #[arg(long, default_value = "127.0.0.1:8089")]
    pub bind: SocketAddr,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Show the effective configuration (secrets redacted)
    Show,
    /// Store an API key in the system keyring for a profile
    SetKey,
}

// ── Shared value types ───────────────────────────────────────────────

/// An RGB triple parsed from `R,G,B`.
#[derive(Debug, Clone, Copy)]
pub struct Rgb(pub u8, pub u8, pub u8);

fn parse_rgb(raw: &str) -> Result<Rgb, String> {
    let parts: Vec<&str> = raw.split(',').collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(format!("expected R,G,B (e.g. 255,0,0), got '{raw}'"));
    };
    let parse = |s: &str| {
        s.trim()
            .parse::<u8>()
            .map_err(|_| format!("invalid channel value '{s}' (0-255)"))
    };
    Ok(Rgb(parse(r)?, parse(g)?, parse(b)?))
}
