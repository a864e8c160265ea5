//! # Serial Link
//!
//! Owns the serial device: opens it with bounded reconnect-with-backoff,
//! splits the byte stream into lines, parses each line into a `Reading`,
//! and forwards accepted readings to the ingestion pipeline over a bounded
//! channel.
//!
//! The read loop lives on a dedicated blocking task and is supervised
//! through [`LinkReaderHandle`]: the rest of the system can observe
//! "serial source is down" as a status instead of silence, and shutdown
//! interrupts any backoff sleep.
//!
//! Malformed input never escapes this crate: garbage lines are counted and
//! dropped, device churn re-enters the reconnect path, and only an
//! exhausted reconnect budget ends the task (status `Dead`); the process
//! and HTTP ingestion keep running.

mod framer;
mod metrics;
mod parser;
mod reader;

pub use framer::LineFramer;
pub use metrics::{LinkMetrics, LinkMetricsSnapshot};
pub use parser::{parse_line, LineRejection};
pub use reader::{spawn_link_reader, LinkReaderHandle, LinkStatus};
