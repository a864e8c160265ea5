//! Layered error definitions
//!
//! Categorized by source: config / serial device / store / query

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Serial Link Errors =====
    /// Serial device could not be opened; fatal to the reader task only
    #[error("failed to open serial device '{port}': {message}")]
    DeviceOpen { port: String, message: String },

    /// Transient mid-stream read failure; retried after backoff
    #[error("serial read error: {message}")]
    SerialRead { message: String },

    // ===== Store Errors =====
    /// Persistence or query failure, surfaced to the immediate caller
    #[error("store {operation} failed: {message}")]
    Store { operation: String, message: String },

    // ===== Query Errors =====
    /// Unresolvable sensor alias; a client error, not a server error
    #[error("unknown sensor key: {key}")]
    InvalidSensorKey { key: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create device open error
    pub fn device_open(port: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DeviceOpen {
            port: port.into(),
            message: message.into(),
        }
    }

    /// Create serial read error
    pub fn serial_read(message: impl Into<String>) -> Self {
        Self::SerialRead {
            message: message.into(),
        }
    }

    /// Create store error
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create invalid sensor key error
    pub fn invalid_sensor_key(key: impl Into<String>) -> Self {
        Self::InvalidSensorKey { key: key.into() }
    }

    /// True for errors that map to a client mistake rather than a fault
    /// inside the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidSensorKey { .. })
    }
}
