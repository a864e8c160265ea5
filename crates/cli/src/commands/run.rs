//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use contracts::HubConfig;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Orchestrator, OrchestratorConfig};

/// Execute the `run` command
pub async fn run_hub(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args)?;

    // Apply CLI overrides
    if let Some(ref port) = args.serial_port {
        info!(port = %port, "Overriding serial port from CLI");
        config.serial.port = port.clone();
    }
    if let Some(baud) = args.baud_rate {
        info!(baud = baud, "Overriding baud rate from CLI");
        config.serial.baud_rate = baud;
    }
    if let Some(ref db_path) = args.db_path {
        info!(db = %db_path.display(), "Overriding database path from CLI");
        config.storage.db_path = db_path.clone();
    }
    if let Some(ref bind) = args.bind {
        info!(bind = %bind, "Overriding bind address from CLI");
        config.server.bind = bind.clone();
    }
    if args.no_serial {
        config.serial.enabled = false;
    }

    info!(
        serial_port = %config.serial.port,
        baud = config.serial.baud_rate,
        serial_enabled = config.serial.enabled,
        db = %config.storage.db_path.display(),
        bind = %config.server.bind,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let orchestrator = Orchestrator::new(OrchestratorConfig {
        hub_config: config,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    });

    info!("Starting telemetry hub...");

    let stats = orchestrator.run(shutdown_signal()).await?;
    stats.print_summary();

    info!("Telemetry hub finished");
    Ok(())
}

/// Load the configuration file, or fall back to the stock defaults when
/// the caller names none.
fn load_config(args: &RunArgs) -> Result<HubConfig> {
    match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::ConfigNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            info!(config = %path.display(), "Loading configuration");
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => {
            info!("No configuration file given, using stock defaults");
            Ok(HubConfig::default())
        }
    }
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &HubConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Serial:");
    if config.serial.enabled {
        println!("  Device: {} @ {} baud", config.serial.port, config.serial.baud_rate);
        println!(
            "  Reconnect: {} attempts, {}ms backoff",
            config.serial.reconnect_attempts, config.serial.reconnect_backoff_ms
        );
    } else {
        println!("  Disabled (HTTP ingestion only)");
    }
    println!("\nStorage:");
    println!("  Database: {}", config.storage.db_path.display());
    println!("\nServer:");
    println!("  Bind: {}", config.server.bind);
    println!(
        "  Query limits: default {}, max {}",
        config.server.default_query_limit, config.server.max_query_limit
    );
    println!("\nBroadcast:");
    println!("  Observer queue depth: {}", config.broadcast.queue_capacity);
    println!();
}
