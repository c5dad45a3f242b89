//! Acquisition and session pipeline.
//!
//! - `FallbackAggregator`: ordered provider fallback with retry and cache
//! - `Session`: per-game snapshots and background refreshes

pub mod aggregate;
pub mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::{FallbackAggregator, History, HistoryOrigin, RetryPolicy};
pub use session::{Session, Snapshot};
