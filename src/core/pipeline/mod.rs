//! # Pipeline Module
//!
//! Orchestrates a full sort run.
//!
//! ## Pipeline Stages
//! 1. **Scan source** - Discover media files under the source root
//! 2. **Fingerprint source** - Hash and date every file on the worker pool
//! 3. **Filter** - Optionally drop tiny photos and videos
//! 4. **Scan destination** - Whole tree or only the date directories in play
//! 5. **Fingerprint destination** - Dates only when relocating
//! 6. **Dedup** - Decide New/Skip/Replace/Relocate per fingerprint
//! 7. **Copy**, then **Relocate** when moving duplicates

mod executor;

pub use executor::{
    DestinationScan, Pipeline, PipelineBuilder, PipelineConfig, DEFAULT_DESTINATION,
    DEFAULT_TINY_THRESHOLD,
};

/// Summary of a finished run
pub type RunReport = crate::events::PipelineSummary;
