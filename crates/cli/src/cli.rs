//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Telemetry Hub - sensor reading ingestion and fan-out service
#[derive(Parser, Debug)]
#[command(
    name = "telemetry-hub",
    author,
    version,
    about = "Sensor telemetry ingestion hub",
    long_about = "Ingests line-delimited JSON sensor readings from a serial link and an \n\
                  HTTP push endpoint, persists every reading, fans it out to realtime \n\
                  observers over WebSocket, and serves a historical query API."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TELEMETRY_HUB_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TELEMETRY_HUB_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ingestion hub
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); stock defaults when omitted
    #[arg(short, long, env = "TELEMETRY_HUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override serial device path from configuration
    #[arg(long, env = "TELEMETRY_HUB_SERIAL_PORT")]
    pub serial_port: Option<String>,

    /// Override serial baud rate from configuration
    #[arg(long, env = "TELEMETRY_HUB_BAUD_RATE")]
    pub baud_rate: Option<u32>,

    /// Override database file from configuration
    #[arg(long, env = "TELEMETRY_HUB_DB")]
    pub db_path: Option<PathBuf>,

    /// Override HTTP bind address from configuration
    #[arg(long, env = "TELEMETRY_HUB_BIND")]
    pub bind: Option<String>,

    /// Disable the serial reader; HTTP ingestion keeps working
    #[arg(long)]
    pub no_serial: bool,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "TELEMETRY_HUB_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
