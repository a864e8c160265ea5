//! QueryService - read-only historical/metrics API over the store.

use contracts::{ContractError, MetricsSummary, PersistedReading, ReadingStore, SensorField, SensorRow};

/// Rate window for `metrics()`, matching the dashboard's definition of rps.
const RATE_WINDOW_SECS: i64 = 60;

/// Paging bounds applied to caller-supplied limits.
#[derive(Debug, Clone, Copy)]
pub struct QueryLimits {
    /// Page size when the caller supplies none
    pub default_limit: u32,
    /// Upper bound on any caller-supplied limit
    pub max_limit: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 500,
        }
    }
}

/// Read-only query API.
///
/// Depends only on the store trait and the persisted shape of readings,
/// never on the ingestion side.
pub struct QueryService<S> {
    store: S,
    limits: QueryLimits,
}

impl<S: ReadingStore> QueryService<S> {
    pub fn new(store: S, limits: QueryLimits) -> Self {
        Self { store, limits }
    }

    /// Most-recent-first readings, bounded by `limit` (default/clamped per
    /// [`QueryLimits`]).
    pub async fn recent(&self, limit: Option<u32>) -> Result<Vec<PersistedReading>, ContractError> {
        self.store.query_recent(self.effective_limit(limit)).await
    }

    /// All-time count plus the trailing-60s ingestion rate.
    pub async fn metrics(&self) -> Result<MetricsSummary, ContractError> {
        let total = self.store.count_all().await?;
        let windowed = self.store.count_since(RATE_WINDOW_SECS).await?;
        Ok(MetricsSummary {
            total,
            rps: windowed as f64 / RATE_WINDOW_SECS as f64,
        })
    }

    /// Single-sensor time series, alias-resolved.
    ///
    /// # Errors
    /// `InvalidSensorKey` when `key` resolves to no field; callers map this
    /// to a client error.
    pub async fn by_sensor(
        &self,
        key: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<SensorRow>, ContractError> {
        let field =
            SensorField::resolve(key).ok_or_else(|| ContractError::invalid_sensor_key(key))?;
        self.store
            .query_sensor_column(field, self.effective_limit(limit), offset.unwrap_or(0))
            .await
    }

    fn effective_limit(&self, limit: Option<u32>) -> u32 {
        limit
            .unwrap_or(self.limits.default_limit)
            .min(self.limits.max_limit)
    }
}
