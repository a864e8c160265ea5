//! Hub metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for the broadcast hub
#[derive(Debug, Default)]
pub struct HubMetrics {
    /// Currently registered observers
    observer_count: AtomicUsize,
    /// Total successful deliveries (one per observer per reading)
    delivered_count: AtomicU64,
    /// Total deliveries dropped due to a full observer queue
    dropped_count: AtomicU64,
    /// Total observers removed after a dead connection
    evicted_count: AtomicU64,
}

impl HubMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current observer count
    pub fn observer_count(&self) -> usize {
        self.observer_count.load(Ordering::Relaxed)
    }

    /// Set current observer count
    pub fn set_observer_count(&self, count: usize) {
        self.observer_count.store(count, Ordering::Relaxed);
    }

    /// Get total delivered count
    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    /// Increment delivered count
    pub fn inc_delivered_count(&self) {
        self.delivered_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get dropped count
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Increment dropped count
    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get evicted count
    pub fn evicted_count(&self) -> u64 {
        self.evicted_count.load(Ordering::Relaxed)
    }

    /// Increment evicted count
    pub fn inc_evicted_count(&self) {
        self.evicted_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> HubMetricsSnapshot {
        HubMetricsSnapshot {
            observer_count: self.observer_count(),
            delivered_count: self.delivered_count(),
            dropped_count: self.dropped_count(),
            evicted_count: self.evicted_count(),
        }
    }
}

/// Snapshot of hub metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct HubMetricsSnapshot {
    pub observer_count: usize,
    pub delivered_count: u64,
    pub dropped_count: u64,
    pub evicted_count: u64,
}
