//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::HubConfig;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    serial_port: String,
    baud_rate: u32,
    serial_enabled: bool,
    db_path: String,
    bind: String,
    default_query_limit: u32,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    serial_port: config.serial.port.clone(),
                    baud_rate: config.serial.baud_rate,
                    serial_enabled: config.serial.enabled,
                    db_path: config.storage.db_path.display().to_string(),
                    bind: config.server.bind.clone(),
                    default_query_limit: config.server.default_query_limit,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &HubConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.serial.enabled {
        warnings.push("Serial link disabled - readings arrive via HTTP push only".to_string());
    }

    if config.serial.reconnect_attempts == 0 {
        warnings.push(
            "serial.reconnect_attempts is 0 - the first failed open ends the reader task"
                .to_string(),
        );
    }

    if config.broadcast.queue_capacity < 8 {
        warnings.push(format!(
            "broadcast.queue_capacity is {} - slow observers will drop deliveries quickly",
            config.broadcast.queue_capacity
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            if summary.serial_enabled {
                println!(
                    "\n  Serial: {} @ {} baud",
                    summary.serial_port, summary.baud_rate
                );
            } else {
                println!("\n  Serial: disabled");
            }
            println!("  Database: {}", summary.db_path);
            println!("  Bind: {}", summary.bind);
            println!("  Default query limit: {}", summary.default_query_limit);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_valid_config_passes() {
        let (_dir, path) = write_config(
            r#"
[serial]
port = "/dev/ttyUSB0"
"#,
        );
        let result = validate_config(&ValidateArgs {
            config: path,
            json: false,
        });
        assert!(result.valid);
        assert!(result.warnings.is_none());
    }

    #[test]
    fn test_disabled_serial_warns() {
        let (_dir, path) = write_config(
            r#"
[serial]
enabled = false
"#,
        );
        let result = validate_config(&ValidateArgs {
            config: path,
            json: false,
        });
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings[0].contains("HTTP push only"));
    }

    #[test]
    fn test_bad_config_fails() {
        let (_dir, path) = write_config(
            r#"
[serial]
baud_rate = 0
"#,
        );
        let result = validate_config(&ValidateArgs {
            config: path,
            json: false,
        });
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("baud_rate"));
    }

    #[test]
    fn test_missing_file_fails() {
        let result = validate_config(&ValidateArgs {
            config: "/nonexistent/config.toml".into(),
            json: false,
        });
        assert!(!result.valid);
    }
}
