//! # Server
//!
//! HTTP surface and realtime channel over the ingestion pipeline and the
//! query service.
//!
//! Routes (paths are the dashboard's, kept verbatim):
//! - `GET /api/sensores/recentes`: recent readings
//! - `GET /api/sensores/metrics`: aggregate stats
//! - `POST /api/readings/ingest`: external push ingestion (201)
//! - `GET /api/readings/:sensor_id`: single-sensor time series
//! - `GET /ws`: WebSocket, one `nova_leitura` event per ingested reading
//!
//! Handler failures become `{"erro": …}` bodies: 400 for an invalid sensor
//! key, 500 for everything else.

mod error;
mod handlers;
mod realtime;

pub use error::ApiError;

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use broadcast::BroadcastHub;
use contracts::{ContractError, ReadingStore};
use ingestion::IngestionPipeline;
use storage::QueryService;

/// Shared handler state.
pub struct AppState<S> {
    pub pipeline: Arc<IngestionPipeline<S>>,
    pub query: Arc<QueryService<S>>,
    pub hub: Arc<BroadcastHub>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            query: Arc::clone(&self.query),
            hub: Arc::clone(&self.hub),
        }
    }
}

/// Build the full router over the given state.
///
/// The dashboard is served from another origin, so CORS stays wide open.
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: ReadingStore + Sync + 'static,
{
    Router::new()
        .route(
            "/api/sensores/recentes",
            get(handlers::recent_readings::<S>),
        )
        .route("/api/sensores/metrics", get(handlers::ingest_metrics::<S>))
        .route("/api/readings/ingest", post(handlers::ingest_reading::<S>))
        .route("/api/readings/:sensor_id", get(handlers::sensor_series::<S>))
        .route("/ws", get(realtime::realtime_channel::<S>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the shutdown future resolves.
pub async fn serve(
    bind: &str,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ContractError> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
