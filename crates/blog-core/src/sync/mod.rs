//! Bidirectional post synchronization
//!
//! This module provides:
//! - **engine**: the four-phase [`SyncEngine`]
//! - **freshness**: modification-time comparison with clock-skew tolerance
//! - **report**: the [`SyncReport`] summarizing a run

mod engine;
mod freshness;
mod report;

pub use engine::{SyncEngine, SyncOptions};
pub use freshness::{SKEW_TOLERANCE_MS, local_is_newer, remote_is_newer};
pub use report::SyncReport;
