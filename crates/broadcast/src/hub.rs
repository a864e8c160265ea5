//! BroadcastHub - observer registry and fan-out

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use contracts::PersistedReading;

use crate::metrics::HubMetrics;

/// Fan-out hub for persisted readings.
///
/// The registry is the one piece of shared mutable state in the ingestion
/// path and only hub methods touch it. `publish` never blocks: each
/// observer has a bounded queue and delivery to one observer is independent
/// of all others. A full queue drops that delivery only; a closed queue
/// evicts the observer.
pub struct BroadcastHub {
    observers: Mutex<HashMap<u64, mpsc::Sender<PersistedReading>>>,
    next_id: AtomicU64,
    queue_capacity: usize,
    metrics: Arc<HubMetrics>,
}

impl BroadcastHub {
    /// Create a hub with the given per-observer queue depth.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            observers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            queue_capacity,
            metrics: Arc::new(HubMetrics::new()),
        }
    }

    /// Register a new observer and hand back its receiving end.
    pub fn subscribe(&self) -> ObserverHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.queue_capacity);

        let mut observers = self.lock_registry();
        observers.insert(id, tx);
        self.metrics.set_observer_count(observers.len());
        drop(observers);

        debug!(observer_id = id, "observer subscribed");
        ObserverHandle { id, rx }
    }

    /// Remove an observer; a no-op when it is already gone.
    pub fn unsubscribe(&self, id: u64) {
        let mut observers = self.lock_registry();
        if observers.remove(&id).is_some() {
            self.metrics.set_observer_count(observers.len());
            drop(observers);
            debug!(observer_id = id, "observer unsubscribed");
        }
    }

    /// Deliver a reading to every current observer.
    ///
    /// Per-observer queues preserve ingestion order; two readings published
    /// in order are never received out of order by the same observer.
    pub fn publish(&self, reading: &PersistedReading) {
        let mut dead: Vec<u64> = Vec::new();

        let observers = self.lock_registry();
        for (id, tx) in observers.iter() {
            match tx.try_send(reading.clone()) {
                Ok(()) => {
                    self.metrics.inc_delivered_count();
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.metrics.inc_dropped_count();
                    warn!(
                        observer_id = id,
                        reading_id = reading.id,
                        "observer queue full, delivery dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    dead.push(*id);
                }
            }
        }
        drop(observers);

        if !dead.is_empty() {
            let mut observers = self.lock_registry();
            for id in dead {
                if observers.remove(&id).is_some() {
                    self.metrics.inc_evicted_count();
                    debug!(observer_id = id, "dead observer evicted");
                }
            }
            self.metrics.set_observer_count(observers.len());
        }
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.lock_registry().len()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<HubMetrics> {
        self.metrics.clone()
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, HashMap<u64, mpsc::Sender<PersistedReading>>> {
        // A panicked holder leaves the registry structurally intact, so
        // recover rather than poison the whole hub.
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving end of one observer subscription.
///
/// Dropping the handle closes the queue; the hub evicts the entry on the
/// next publish. Callers that know they are done should still call
/// [`BroadcastHub::unsubscribe`] to release the slot eagerly.
pub struct ObserverHandle {
    id: u64,
    rx: mpsc::Receiver<PersistedReading>,
}

impl ObserverHandle {
    /// Observer id, for `unsubscribe`.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next reading; `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<PersistedReading> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<PersistedReading> {
        self.rx.try_recv().ok()
    }
}
