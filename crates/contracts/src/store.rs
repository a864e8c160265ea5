//! ReadingStore trait - persistence collaborator interface
//!
//! The ingestion pipeline and the query service only ever see this trait;
//! the concrete adapter decides where rows live.

use crate::{ContractError, PersistedReading, Reading, SensorField, SensorRow};

/// Persistence operations required by the pipeline and the query service.
///
/// Implementations own their concurrency discipline: each operation must be
/// safe to call from arbitrary tasks and must acquire and release its own
/// connection on every exit path.
#[trait_variant::make(ReadingStore: Send)]
pub trait LocalReadingStore {
    /// Persist one reading, assigning `id` and `timestamp`.
    async fn insert(&self, reading: Reading) -> Result<PersistedReading, ContractError>;

    /// All-time reading count.
    async fn count_all(&self) -> Result<i64, ContractError>;

    /// Count of readings persisted within the trailing `window_secs` seconds.
    async fn count_since(&self, window_secs: i64) -> Result<i64, ContractError>;

    /// Most-recent-first page of full readings.
    async fn query_recent(&self, limit: u32) -> Result<Vec<PersistedReading>, ContractError>;

    /// Most-recent-first page of one sensor column.
    async fn query_sensor_column(
        &self,
        field: SensorField,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<SensorRow>, ContractError>;
}
