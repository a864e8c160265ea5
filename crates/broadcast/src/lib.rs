//! # Broadcast
//!
//! Real-time fan-out of persisted readings to connected observers.
//!
//! The hub owns the observer registry; producers call [`BroadcastHub::publish`]
//! and never see individual observers. Delivery uses a bounded queue per
//! observer, so one slow or dead connection cannot stall ingestion or the
//! other observers.

mod hub;
mod metrics;

pub use hub::{BroadcastHub, ObserverHandle};
pub use metrics::{HubMetrics, HubMetricsSnapshot};
