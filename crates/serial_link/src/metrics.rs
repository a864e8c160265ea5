//! Link reader metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one link reader task
#[derive(Debug, Default)]
pub struct LinkMetrics {
    /// Total framed lines seen
    lines_read: AtomicU64,
    /// Lines skipped by the `{` gate (banners, blanks, noise)
    lines_skipped: AtomicU64,
    /// Lines the parser rejected
    lines_rejected: AtomicU64,
    /// Readings handed to the pipeline channel
    readings_forwarded: AtomicU64,
    /// Reopen cycles after disconnects
    reconnects: AtomicU64,
}

impl LinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }

    pub fn inc_lines_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped.load(Ordering::Relaxed)
    }

    pub fn inc_lines_skipped(&self) {
        self.lines_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lines_rejected(&self) -> u64 {
        self.lines_rejected.load(Ordering::Relaxed)
    }

    pub fn inc_lines_rejected(&self) {
        self.lines_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn readings_forwarded(&self) -> u64 {
        self.readings_forwarded.load(Ordering::Relaxed)
    }

    pub fn inc_readings_forwarded(&self) {
        self.readings_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reconnects(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }

    pub fn inc_reconnects(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> LinkMetricsSnapshot {
        LinkMetricsSnapshot {
            lines_read: self.lines_read(),
            lines_skipped: self.lines_skipped(),
            lines_rejected: self.lines_rejected(),
            readings_forwarded: self.readings_forwarded(),
            reconnects: self.reconnects(),
        }
    }
}

/// Snapshot of link metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct LinkMetricsSnapshot {
    pub lines_read: u64,
    pub lines_skipped: u64,
    pub lines_rejected: u64,
    pub readings_forwarded: u64,
    pub reconnects: u64,
}
