//! # Core Module
//!
//! The sorting engine, independent of any front end.
//!
//! ## Modules
//! - `scanner` - Discovers media files in directories
//! - `media` - Media items, fingerprints and the fingerprint index
//! - `hasher` - Prefix content fingerprints
//! - `metadata` - Capture date resolution chain
//! - `pool` - Worker pool for fingerprinting and dating
//! - `dedup` - Source/destination reconciliation
//! - `organize` - Destination layout, naming and file operations
//! - `pipeline` - Orchestrates the full workflow

pub mod dedup;
pub mod hasher;
pub mod media;
pub mod metadata;
pub mod organize;
pub mod pipeline;
pub mod pool;
pub mod scanner;

// Re-export commonly used types
pub use dedup::DuplicateMode;
pub use media::{Fingerprint, FingerprintIndex, MediaItem, MediaKind};
pub use pipeline::{DestinationScan, Pipeline, PipelineBuilder, PipelineConfig, RunReport};
