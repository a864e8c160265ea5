//! Ingestion error types

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestError {
    /// Persistence failed; the reading was not broadcast
    #[error("store failure: {0}")]
    Store(#[source] contracts::ContractError),
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestError>;
