//! Query Service output shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cell from a per-sensor query.
///
/// Untagged so it serializes as the bare JSON scalar. `Text` is the
/// fallback for stored raw encodings that could not be coerced back to a
/// number; such a row keeps its value as-is rather than failing the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

/// One row of a single-sensor time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRow {
    pub id: i64,
    pub value: Scalar,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate ingestion statistics.
///
/// `rps` is the count of readings persisted in the trailing 60 second
/// window divided by 60.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total: i64,
    pub rps: f64,
}
