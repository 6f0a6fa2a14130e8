//! # Media Sorter
//!
//! Sorts photos and videos into a `YYYY/MM/DD` library and reconciles
//! duplicates by content.
//!
//! ## Core Philosophy
//! - **Never lose a file** - sources are only ever copied; destination files
//!   are overwritten only by a larger copy of the same content
//! - **Log every decision** - one tab-aligned line per item in the transfer log
//! - **Contain failures** - a bad file never stops the batch
//!
//! ## Architecture
//! - `core` - scanning, fingerprinting, dating, dedup and placement
//! - `events` - progress reporting for front ends
//! - `error` - error types
//! - `logging` - transfer log setup

pub mod core;
pub mod error;
pub mod events;
pub mod logging;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

/// Initialize tracing to stdout for embedders that do not want a log file
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
