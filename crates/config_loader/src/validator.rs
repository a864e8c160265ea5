//! Configuration validation.
//!
//! Rules:
//! - serial port non-empty, baud_rate > 0
//! - max_line_len and channel_capacity > 0
//! - db_path non-empty
//! - bind parses as a socket address
//! - default_query_limit >= 1 and <= max_query_limit
//! - queue_capacity > 0

use std::net::SocketAddr;

use contracts::{ContractError, HubConfig};

/// Validate a HubConfig.
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &HubConfig) -> Result<(), ContractError> {
    validate_serial(config)?;
    validate_storage(config)?;
    validate_server(config)?;
    validate_broadcast(config)?;
    Ok(())
}

fn validate_serial(config: &HubConfig) -> Result<(), ContractError> {
    let serial = &config.serial;

    if serial.port.is_empty() {
        return Err(ContractError::config_validation(
            "serial.port",
            "serial port cannot be empty",
        ));
    }
    if serial.baud_rate == 0 {
        return Err(ContractError::config_validation(
            "serial.baud_rate",
            "baud_rate must be > 0",
        ));
    }
    if serial.max_line_len == 0 {
        return Err(ContractError::config_validation(
            "serial.max_line_len",
            "max_line_len must be > 0",
        ));
    }
    if serial.channel_capacity == 0 {
        return Err(ContractError::config_validation(
            "serial.channel_capacity",
            "channel_capacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_storage(config: &HubConfig) -> Result<(), ContractError> {
    if config.storage.db_path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "storage.db_path",
            "db_path cannot be empty",
        ));
    }
    Ok(())
}

fn validate_server(config: &HubConfig) -> Result<(), ContractError> {
    let server = &config.server;

    if server.bind.parse::<SocketAddr>().is_err() {
        return Err(ContractError::config_validation(
            "server.bind",
            format!("'{}' is not a valid socket address", server.bind),
        ));
    }
    if server.default_query_limit == 0 {
        return Err(ContractError::config_validation(
            "server.default_query_limit",
            "default_query_limit must be >= 1",
        ));
    }
    if server.default_query_limit > server.max_query_limit {
        return Err(ContractError::config_validation(
            "server.default_query_limit / server.max_query_limit",
            format!(
                "default_query_limit ({}) must be <= max_query_limit ({})",
                server.default_query_limit, server.max_query_limit
            ),
        ));
    }
    Ok(())
}

fn validate_broadcast(config: &HubConfig) -> Result<(), ContractError> {
    if config.broadcast.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "broadcast.queue_capacity",
            "queue_capacity must be > 0",
        ));
    }
    Ok(())
}
