//! HTTP request handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

use contracts::{MetricsSummary, PersistedReading, Reading, ReadingStore, SensorRow};

use crate::error::ApiError;
use crate::AppState;

/// Pagination query parameters; handlers fall back to the service defaults.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// GET `/api/sensores/recentes`
#[instrument(name = "http_recent_readings", skip(state))]
pub async fn recent_readings<S: ReadingStore + Sync>(
    State(state): State<AppState<S>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<PersistedReading>>, ApiError> {
    Ok(Json(state.query.recent(params.limit).await?))
}

/// GET `/api/sensores/metrics`
#[instrument(name = "http_ingest_metrics", skip(state))]
pub async fn ingest_metrics<S: ReadingStore + Sync>(
    State(state): State<AppState<S>>,
) -> Result<Json<MetricsSummary>, ApiError> {
    Ok(Json(state.query.metrics().await?))
}

/// POST `/api/readings/ingest`
///
/// The push source enters the same pipeline the serial reader feeds;
/// success answers 201 with the persisted reading.
#[instrument(name = "http_ingest_reading", skip(state, reading))]
pub async fn ingest_reading<S: ReadingStore + Sync>(
    State(state): State<AppState<S>>,
    Json(reading): Json<Reading>,
) -> Result<(StatusCode, Json<PersistedReading>), ApiError> {
    let persisted = state.pipeline.ingest(reading).await?;
    Ok((StatusCode::CREATED, Json(persisted)))
}

/// GET `/api/readings/:sensor_id`
#[instrument(name = "http_sensor_series", skip(state))]
pub async fn sensor_series<S: ReadingStore + Sync>(
    State(state): State<AppState<S>>,
    Path(sensor_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<SensorRow>>, ApiError> {
    Ok(Json(
        state
            .query
            .by_sensor(&sensor_id, params.limit, params.offset)
            .await?,
    ))
}
