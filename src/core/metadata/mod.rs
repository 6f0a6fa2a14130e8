//! # Metadata Module
//!
//! Resolves a capture timestamp for a media file through an ordered chain of
//! strategies. Each strategy either yields a date or explains why it could
//! not, and the chain moves on to the next one.
//!
//! ## Standard Chain
//! - Embedded EXIF (photos only)
//! - exiftool subprocess (photos and videos, when installed)
//! - Filesystem timestamps (everything)

mod embedded;
mod exiftool;
mod filesystem;

pub use embedded::EmbeddedExif;
pub use exiftool::{parse_tags, ExifTool, DATE_TAG_PRIORITY};
pub use filesystem::FileTimes;

use crate::core::media::MediaKind;
use crate::error::MetadataError;
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::{debug, error, info};

/// One way of finding out when a file was captured
pub trait TimestampStrategy: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Whether this strategy should be tried for the given category
    fn applies_to(&self, kind: MediaKind) -> bool;

    /// Attempt to resolve a timestamp
    fn resolve(&self, path: &Path) -> Result<NaiveDateTime, MetadataError>;

    /// Called when an earlier strategy failed and this one is tried next
    fn announce_fallback(&self, path: &Path, _kind: MediaKind) {
        info!("{}\tfalling back to {}", path.display(), self.name());
    }

    /// Announce even when first in line for a category
    fn always_announces(&self) -> bool {
        false
    }
}

/// Ordered list of timestamp strategies
pub struct ResolverChain {
    strategies: Vec<Box<dyn TimestampStrategy>>,
}

impl ResolverChain {
    /// Build a chain from explicit strategies, tried in the given order
    pub fn new(strategies: Vec<Box<dyn TimestampStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard chain. Passing `None` leaves exiftool out entirely.
    pub fn standard(exiftool: Option<ExifTool>) -> Self {
        let mut strategies: Vec<Box<dyn TimestampStrategy>> = vec![Box::new(EmbeddedExif)];
        if let Some(tool) = exiftool {
            strategies.push(Box::new(tool));
        }
        strategies.push(Box::new(FileTimes));
        Self::new(strategies)
    }

    /// Names of the strategies in order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Try every applicable strategy in order, returning the first date found.
    ///
    /// Logs an error and returns `None` when nothing yields a date.
    pub fn resolve(&self, path: &Path, kind: MediaKind) -> Option<NaiveDateTime> {
        let applicable = self.strategies.iter().filter(|s| s.applies_to(kind));

        for (attempt, strategy) in applicable.enumerate() {
            if attempt > 0 || strategy.always_announces() {
                strategy.announce_fallback(path, kind);
            }

            match strategy.resolve(path) {
                Ok(taken) => {
                    debug!("{}\t{} resolved {}", path.display(), strategy.name(), taken);
                    return Some(taken);
                }
                Err(e) => {
                    debug!("{}\t{}: {}", path.display(), strategy.name(), e);
                }
            }
        }

        error!("{}\tunable to find date", path.display());
        None
    }
}
