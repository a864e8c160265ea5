//! Run orchestrator - wires components and supervises the run.
//!
//! Startup order: store, hub, pipeline, query service, serial reader,
//! ingest loop, HTTP server. Teardown runs in reverse once the shutdown
//! future resolves: the server stops accepting, the reader stops, the
//! channel drains, then the loop ends.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use broadcast::BroadcastHub;
use contracts::HubConfig;
use ingestion::{run_ingest_loop, IngestionPipeline};
use observability::{record_hub_gauges, record_link_gauges, HubGauges, LinkGauges};
use serial_link::{spawn_link_reader, LinkStatus};
use server::{build_router, AppState};
use storage::{QueryLimits, QueryService, SqliteStore};

use super::RunStats;

/// Interval at which component counters are republished as gauges.
const GAUGE_TICK: Duration = Duration::from_secs(10);

/// Orchestrator configuration
pub struct OrchestratorConfig {
    /// The full service configuration
    pub hub_config: HubConfig,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main run orchestrator
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Run until the shutdown future resolves, then tear down gracefully.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<RunStats> {
        let start = Instant::now();
        let config = self.config.hub_config;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
        }

        // Store, hub, pipeline, query service
        let store = SqliteStore::open(config.storage.db_path.clone())
            .context("Failed to open reading store")?;
        let hub = Arc::new(BroadcastHub::new(config.broadcast.queue_capacity));
        let pipeline = Arc::new(IngestionPipeline::new(store.clone(), Arc::clone(&hub)));
        let query = Arc::new(QueryService::new(
            store,
            QueryLimits {
                default_limit: config.server.default_query_limit,
                max_limit: config.server.max_query_limit,
            },
        ));

        // Serial reader and ingest loop; the orchestrator keeps one sender
        // so the channel stays open until teardown.
        let (reading_tx, reading_rx) = async_channel::bounded(config.serial.channel_capacity);
        let link = if config.serial.enabled {
            Some(spawn_link_reader(config.serial.clone(), reading_tx.clone()))
        } else {
            info!("Serial link disabled, running HTTP ingestion only");
            None
        };
        let link_metrics = link.as_ref().map(|l| l.metrics());
        let ingest_loop = tokio::spawn(run_ingest_loop(reading_rx, Arc::clone(&pipeline)));

        // HTTP server with watch-triggered graceful shutdown
        let router = build_router(AppState {
            pipeline,
            query: Arc::clone(&query),
            hub: Arc::clone(&hub),
        });
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut server_task = tokio::spawn({
            let bind = config.server.bind.clone();
            let mut stop = stop_rx;
            async move {
                server::serve(&bind, router, async move {
                    let _ = stop.changed().await;
                })
                .await
            }
        });

        info!("Telemetry hub running");

        // Supervision loop: republish gauges, surface a dead serial link.
        let mut tick = tokio::time::interval(GAUGE_TICK);
        tokio::pin!(shutdown);
        let mut link_dead_reported = false;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                result = &mut server_task => {
                    // The server only returns on its own when it failed
                    // (e.g. the bind address is taken); stop the reader and
                    // surface the error instead of running on blindly.
                    if let Some(link) = link {
                        link.shutdown().await;
                    }
                    drop(reading_tx);
                    let _ = ingest_loop.await;
                    return Err(match result {
                        Ok(Ok(())) => anyhow::anyhow!("HTTP server exited unexpectedly"),
                        Ok(Err(e)) => anyhow::Error::new(e).context("HTTP server failed"),
                        Err(e) => anyhow::Error::new(e).context("Server task panicked"),
                    });
                }
                _ = tick.tick() => {
                    if let Some(link) = &link {
                        let snapshot = link.metrics().snapshot();
                        record_link_gauges(&LinkGauges {
                            lines_read: snapshot.lines_read,
                            lines_skipped: snapshot.lines_skipped,
                            lines_rejected: snapshot.lines_rejected,
                            readings_forwarded: snapshot.readings_forwarded,
                            reconnects: snapshot.reconnects,
                            connected: link.status() == LinkStatus::Connected,
                        });
                        if link.status() == LinkStatus::Dead && !link_dead_reported {
                            warn!("Serial link reader is dead; HTTP ingestion continues");
                            link_dead_reported = true;
                        }
                    }
                    let hub_snapshot = hub.metrics().snapshot();
                    record_hub_gauges(&HubGauges {
                        observers: hub_snapshot.observer_count,
                        delivered: hub_snapshot.delivered_count,
                        dropped: hub_snapshot.dropped_count,
                        evicted: hub_snapshot.evicted_count,
                    });
                }
            }
        }

        // Teardown in reverse order
        let _ = stop_tx.send(true);
        if let Some(link) = link {
            link.shutdown().await;
        }
        drop(reading_tx);
        ingest_loop.await.context("Ingest loop panicked")?;
        match server_task.await {
            Ok(result) => result.context("HTTP server failed")?,
            Err(e) => warn!(error = ?e, "Server task panicked"),
        }

        let total_readings = query.metrics().await.map(|m| m.total).unwrap_or_default();

        Ok(RunStats {
            duration: start.elapsed(),
            total_readings,
            link: link_metrics.map(|m| m.snapshot()),
            hub: hub.metrics().snapshot(),
        })
    }
}
