//! Ingestion Pipeline main entry

use std::sync::Arc;

use async_channel::Receiver;
use metrics::counter;
use tracing::{debug, error, info, instrument};

use broadcast::BroadcastHub;
use contracts::{PersistedReading, Reading, ReadingStore};

use crate::error::IngestError;

/// Persist-then-broadcast chokepoint.
///
/// Holds no mutable state of its own; the store and the hub own their
/// respective concurrency disciplines, so `ingest` is safe to call from the
/// serial drain loop and any number of HTTP handlers at once.
pub struct IngestionPipeline<S> {
    store: S,
    hub: Arc<BroadcastHub>,
}

impl<S: ReadingStore> IngestionPipeline<S> {
    /// Create a pipeline over the given store and hub.
    pub fn new(store: S, hub: Arc<BroadcastHub>) -> Self {
        Self { store, hub }
    }

    /// Ingest one reading: persist, then fan out, then return the
    /// persisted result.
    ///
    /// # Errors
    /// `IngestError::Store` when persistence fails; no observer sees the
    /// reading in that case.
    #[instrument(name = "pipeline_ingest", skip(self, reading))]
    pub async fn ingest(&self, reading: Reading) -> Result<PersistedReading, IngestError> {
        let persisted = self.store.insert(reading).await.map_err(|e| {
            counter!("telemetry_hub_ingest_failures_total").increment(1);
            IngestError::Store(e)
        })?;

        self.hub.publish(&persisted);
        counter!("telemetry_hub_readings_ingested_total").increment(1);
        debug!(reading_id = persisted.id, "reading persisted and broadcast");

        Ok(persisted)
    }

    /// The hub readings are fanned out through.
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }
}

/// Drain the serial channel into the pipeline until the channel closes.
///
/// Store failures are logged and absorbed; there is no caller to report to
/// on this path and one bad reading must never stop the loop.
#[instrument(name = "serial_ingest_loop", skip(rx, pipeline))]
pub async fn run_ingest_loop<S: ReadingStore>(
    rx: Receiver<Reading>,
    pipeline: Arc<IngestionPipeline<S>>,
) {
    info!("serial ingest loop started");

    while let Ok(reading) = rx.recv().await {
        match pipeline.ingest(reading).await {
            Ok(persisted) => {
                info!(reading_id = persisted.id, "new reading saved and emitted");
            }
            Err(e) => {
                error!(error = %e, "serial reading lost to store failure");
            }
        }
    }

    info!("serial ingest loop stopped, channel closed");
}
