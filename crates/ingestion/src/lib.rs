//! # Ingestion
//!
//! The single chokepoint every reading goes through, whatever its source.
//!
//! Both the serial link reader and the HTTP push endpoint call
//! [`IngestionPipeline::ingest`], which persists first and broadcasts
//! second; nothing un-persisted ever reaches an observer.

mod error;
mod pipeline;

pub use error::{IngestError, Result};
pub use pipeline::{run_ingest_loop, IngestionPipeline};
