//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::HubConfig;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    serial: SerialInfo,
    storage: StorageInfo,
    server: ServerInfo,
    broadcast: BroadcastInfo,
}

#[derive(Serialize)]
struct SerialInfo {
    port: String,
    baud_rate: u32,
    enabled: bool,
    reconnect_attempts: u32,
    reconnect_backoff_ms: u64,
    read_backoff_ms: u64,
    max_line_len: usize,
    channel_capacity: usize,
}

#[derive(Serialize)]
struct StorageInfo {
    db_path: String,
}

#[derive(Serialize)]
struct ServerInfo {
    bind: String,
    default_query_limit: u32,
    max_query_limit: u32,
}

#[derive(Serialize)]
struct BroadcastInfo {
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::ConfigNotFound {
            path: args.config.display().to_string(),
        }
        .into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &HubConfig) -> ConfigInfo {
    ConfigInfo {
        serial: SerialInfo {
            port: config.serial.port.clone(),
            baud_rate: config.serial.baud_rate,
            enabled: config.serial.enabled,
            reconnect_attempts: config.serial.reconnect_attempts,
            reconnect_backoff_ms: config.serial.reconnect_backoff_ms,
            read_backoff_ms: config.serial.read_backoff_ms,
            max_line_len: config.serial.max_line_len,
            channel_capacity: config.serial.channel_capacity,
        },
        storage: StorageInfo {
            db_path: config.storage.db_path.display().to_string(),
        },
        server: ServerInfo {
            bind: config.server.bind.clone(),
            default_query_limit: config.server.default_query_limit,
            max_query_limit: config.server.max_query_limit,
        },
        broadcast: BroadcastInfo {
            queue_capacity: config.broadcast.queue_capacity,
        },
    }
}

fn print_config_info(config: &HubConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Telemetry Hub Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🔌 Serial Link");
    if config.serial.enabled {
        println!("   ├─ Device: {}", config.serial.port);
        println!("   ├─ Baud rate: {}", config.serial.baud_rate);
        println!(
            "   ├─ Reconnect: {} attempts, {}ms backoff",
            config.serial.reconnect_attempts, config.serial.reconnect_backoff_ms
        );
        println!("   ├─ Read retry backoff: {}ms", config.serial.read_backoff_ms);
        println!("   ├─ Max line length: {} bytes", config.serial.max_line_len);
        println!("   └─ Channel capacity: {}", config.serial.channel_capacity);
    } else {
        println!("   └─ Disabled (HTTP ingestion only)");
    }

    println!("\n💾 Storage");
    println!("   └─ Database: {}", config.storage.db_path.display());

    println!("\n🌐 Server");
    println!("   ├─ Bind: {}", config.server.bind);
    println!(
        "   └─ Query limits: default {}, max {}",
        config.server.default_query_limit, config.server.max_query_limit
    );

    println!("\n📡 Broadcast");
    println!(
        "   └─ Observer queue depth: {}",
        config.broadcast.queue_capacity
    );

    println!();
}
