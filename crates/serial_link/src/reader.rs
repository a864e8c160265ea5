//! LinkReader - supervised serial read loop on a dedicated blocking task.

use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_channel::Sender;
use serialport::SerialPort;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use contracts::{Reading, SerialLinkConfig};

use crate::framer::LineFramer;
use crate::metrics::LinkMetrics;
use crate::parser;

/// Serial port read timeout; a timed-out read is an idle tick, not an error.
const READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// Granularity at which backoff sleeps poll the shutdown flag.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Observable state of the reader task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Trying to open the device
    Connecting,
    /// Device open, reading lines
    Connected,
    /// Waiting out a backoff before the next open attempt
    Backoff,
    /// Ended by shutdown
    Stopped,
    /// Reconnect budget exhausted; HTTP ingestion continues without serial
    Dead,
}

impl LinkStatus {
    fn from_u8(raw: u8) -> LinkStatus {
        match raw {
            0 => LinkStatus::Connecting,
            1 => LinkStatus::Connected,
            2 => LinkStatus::Backoff,
            3 => LinkStatus::Stopped,
            _ => LinkStatus::Dead,
        }
    }
}

/// Handle to a running link reader task.
///
/// The task runs until process shutdown, its reconnect budget runs out, or
/// the pipeline channel closes; the handle lets the rest of the system see
/// which of those happened.
pub struct LinkReaderHandle {
    status: Arc<AtomicU8>,
    shutdown: Arc<AtomicBool>,
    metrics: Arc<LinkMetrics>,
    worker_handle: JoinHandle<()>,
}

impl LinkReaderHandle {
    /// Current task status.
    pub fn status(&self) -> LinkStatus {
        LinkStatus::from_u8(self.status.load(Ordering::Relaxed))
    }

    /// Get current metrics
    pub fn metrics(&self) -> Arc<LinkMetrics> {
        self.metrics.clone()
    }

    /// True once the task has exited for any reason.
    pub fn is_finished(&self) -> bool {
        self.worker_handle.is_finished()
    }

    /// Request shutdown and wait for the task to exit.
    ///
    /// Interrupts any in-flight backoff sleep; an in-flight blocking read
    /// ends at its next timeout tick.
    pub async fn shutdown(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Err(e) = self.worker_handle.await {
            error!(error = ?e, "link reader task panicked");
        }
        debug!("link reader shutdown complete");
    }
}

/// Spawn the link reader on a dedicated blocking task.
///
/// Accepted readings are forwarded over `tx` in arrival order; the reader
/// blocks when the pipeline falls behind rather than reordering or
/// dropping accepted data.
pub fn spawn_link_reader(config: SerialLinkConfig, tx: Sender<Reading>) -> LinkReaderHandle {
    let status = Arc::new(AtomicU8::new(LinkStatus::Connecting as u8));
    let shutdown = Arc::new(AtomicBool::new(false));
    let metrics = Arc::new(LinkMetrics::new());

    let worker_status = Arc::clone(&status);
    let worker_shutdown = Arc::clone(&shutdown);
    let worker_metrics = Arc::clone(&metrics);

    let worker_handle = tokio::task::spawn_blocking(move || {
        run_link_blocking(config, tx, worker_status, worker_shutdown, worker_metrics);
    });

    LinkReaderHandle {
        status,
        shutdown,
        metrics,
        worker_handle,
    }
}

/// How one connected read session ended.
enum SessionEnd {
    Shutdown,
    ChannelClosed,
    Disconnected,
}

fn run_link_blocking(
    config: SerialLinkConfig,
    tx: Sender<Reading>,
    status: Arc<AtomicU8>,
    shutdown: Arc<AtomicBool>,
    metrics: Arc<LinkMetrics>,
) {
    let reconnect_backoff = Duration::from_millis(config.reconnect_backoff_ms);
    let mut attempts_left = config.reconnect_attempts;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            set_status(&status, LinkStatus::Stopped);
            return;
        }

        set_status(&status, LinkStatus::Connecting);
        let mut port = match serialport::new(&config.port, config.baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
        {
            Ok(port) => port,
            Err(e) => {
                error!(port = %config.port, error = %e, "failed to open serial device");
                if attempts_left == 0 {
                    error!(
                        port = %config.port,
                        "reconnect budget exhausted, link reader giving up"
                    );
                    set_status(&status, LinkStatus::Dead);
                    return;
                }
                attempts_left -= 1;
                set_status(&status, LinkStatus::Backoff);
                if !interruptible_sleep(&shutdown, reconnect_backoff) {
                    set_status(&status, LinkStatus::Stopped);
                    return;
                }
                continue;
            }
        };

        info!(port = %config.port, baud = config.baud_rate, "serial device connected");
        set_status(&status, LinkStatus::Connected);
        // A successful open restores the full budget for the next churn.
        attempts_left = config.reconnect_attempts;

        match read_session(port.as_mut(), &config, &tx, &shutdown, &metrics) {
            SessionEnd::Shutdown => {
                set_status(&status, LinkStatus::Stopped);
                return;
            }
            SessionEnd::ChannelClosed => {
                info!("pipeline channel closed, link reader stopping");
                set_status(&status, LinkStatus::Stopped);
                return;
            }
            SessionEnd::Disconnected => {
                warn!(port = %config.port, "serial device disconnected");
                metrics.inc_reconnects();
                set_status(&status, LinkStatus::Backoff);
                if !interruptible_sleep(&shutdown, reconnect_backoff) {
                    set_status(&status, LinkStatus::Stopped);
                    return;
                }
            }
        }
    }
}

/// Read lines from an open device until shutdown, disconnect, or the
/// pipeline goes away.
fn read_session(
    port: &mut dyn SerialPort,
    config: &SerialLinkConfig,
    tx: &Sender<Reading>,
    shutdown: &AtomicBool,
    metrics: &LinkMetrics,
) -> SessionEnd {
    let read_backoff = Duration::from_millis(config.read_backoff_ms);
    let mut framer = LineFramer::new(config.max_line_len);
    let mut buf = [0u8; 256];

    loop {
        if shutdown.load(Ordering::Relaxed) {
            return SessionEnd::Shutdown;
        }

        match port.read(&mut buf) {
            Ok(0) => return SessionEnd::Disconnected,
            Ok(n) => {
                for line in framer.feed(&buf[..n]) {
                    metrics.inc_lines_read();

                    if !parser::looks_like_object(&line) {
                        metrics.inc_lines_skipped();
                        continue;
                    }

                    match parser::parse_line(&line) {
                        Ok(reading) => {
                            if tx.send_blocking(reading).is_err() {
                                return SessionEnd::ChannelClosed;
                            }
                            metrics.inc_readings_forwarded();
                        }
                        Err(rejection) => {
                            metrics.inc_lines_rejected();
                            trace!(rejection = ?rejection, "line rejected");
                        }
                    }
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {
                // idle tick; also where a pending shutdown gets noticed
            }
            Err(e) => {
                warn!(error = %e, "transient serial read error, retrying after backoff");
                if !interruptible_sleep(shutdown, read_backoff) {
                    return SessionEnd::Shutdown;
                }
            }
        }
    }
}

fn set_status(status: &AtomicU8, value: LinkStatus) {
    status.store(value as u8, Ordering::Relaxed);
}

/// Sleep in slices, bailing out early on shutdown. Returns false when
/// shutdown was requested.
fn interruptible_sleep(shutdown: &AtomicBool, total: Duration) -> bool {
    let mut remaining = total;
    while remaining > Duration::ZERO {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let step = remaining.min(SLEEP_SLICE);
        std::thread::sleep(step);
        remaining -= step;
    }
    !shutdown.load(Ordering::Relaxed)
}
