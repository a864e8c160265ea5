//! # Storage
//!
//! SQLite-backed persistence for sensor readings plus the read-only query
//! service layered on top of it.
//!
//! Every operation acquires its own scoped connection and releases it on
//! every exit path; nothing here assumes a shared handle, so concurrent
//! callers (the serial drain loop and HTTP handlers) never contend on one
//! connection.

mod query;
mod store;

pub use query::{QueryLimits, QueryService};
pub use store::SqliteStore;
