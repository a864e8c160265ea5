//! HubConfig - Config Loader output
//!
//! Describes the full service configuration: serial link, storage, HTTP
//! server, and broadcast queueing. Every section and field has a default
//! so a missing config file means "run with the stock wiring".

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    /// Serial link settings
    #[serde(default)]
    pub serial: SerialLinkConfig,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Broadcast hub settings
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

/// Serial link reader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialLinkConfig {
    /// Device path, e.g. `/dev/ttyUSB0`
    #[serde(default = "default_serial_port")]
    pub port: String,

    /// Line speed
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Whether to start the reader at all; HTTP ingestion works either way
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Open/reopen attempts before the reader task gives up
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,

    /// Pause between open attempts
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,

    /// Pause after a transient read error before retrying the read
    #[serde(default = "default_read_backoff_ms")]
    pub read_backoff_ms: u64,

    /// Lines longer than this are discarded unparsed
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,

    /// Capacity of the reader → pipeline channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for SerialLinkConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            enabled: true,
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_backoff_ms: default_reconnect_backoff_ms(),
            read_backoff_ms: default_read_backoff_ms(),
            max_line_len: default_max_line_len(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Storage adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Page size when the caller supplies none
    #[serde(default = "default_query_limit")]
    pub default_query_limit: u32,

    /// Upper bound applied to caller-supplied limits
    #[serde(default = "default_max_query_limit")]
    pub max_query_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            default_query_limit: default_query_limit(),
            max_query_limit: default_max_query_limit(),
        }
    }
}

/// Broadcast hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Per-observer delivery queue depth
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_serial_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_true() -> bool {
    true
}

fn default_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_backoff_ms() -> u64 {
    2000
}

fn default_read_backoff_ms() -> u64 {
    1000
}

fn default_max_line_len() -> usize {
    4096
}

fn default_channel_capacity() -> usize {
    256
}

fn default_db_path() -> PathBuf {
    PathBuf::from("telemetry.db")
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_query_limit() -> u32 {
    50
}

fn default_max_query_limit() -> u32 {
    500
}

fn default_queue_capacity() -> usize {
    64
}
