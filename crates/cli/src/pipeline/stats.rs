//! Run statistics.

use std::time::Duration;

use broadcast::HubMetricsSnapshot;
use serial_link::LinkMetricsSnapshot;

/// Statistics from one hub run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Total duration of the run
    pub duration: Duration,

    /// Readings in the store at shutdown
    pub total_readings: i64,

    /// Serial link counters (None when the link was disabled)
    pub link: Option<LinkMetricsSnapshot>,

    /// Broadcast hub counters
    pub hub: HubMetricsSnapshot,
}

impl RunStats {
    /// Fraction of deliveries dropped on full observer queues, as percent
    pub fn delivery_drop_rate(&self) -> f64 {
        let total = self.hub.delivered_count + self.hub.dropped_count;
        if total > 0 {
            (self.hub.dropped_count as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                       Run Statistics                         ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   └─ Readings in store: {}", self.total_readings);

        match &self.link {
            Some(link) => {
                println!("\n🔌 Serial Link");
                println!("   ├─ Lines read: {}", link.lines_read);
                println!("   ├─ Lines skipped (non-JSON): {}", link.lines_skipped);
                println!("   ├─ Lines rejected (malformed): {}", link.lines_rejected);
                println!("   ├─ Readings forwarded: {}", link.readings_forwarded);
                println!("   └─ Reconnects: {}", link.reconnects);
            }
            None => {
                println!("\n🔌 Serial Link: disabled");
            }
        }

        println!("\n📡 Broadcast");
        println!("   ├─ Observers at shutdown: {}", self.hub.observer_count);
        println!("   ├─ Deliveries: {}", self.hub.delivered_count);
        println!(
            "   ├─ Dropped: {} ({:.2}%)",
            self.hub.dropped_count,
            self.delivery_drop_rate()
        );
        println!("   └─ Evicted observers: {}", self.hub.evicted_count);

        println!();
    }
}
