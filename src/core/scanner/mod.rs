//! # Scanner Module
//!
//! Discovers media files under a directory tree.
//!
//! ## Supported Formats
//! - Photos: heic, jpeg, jpg, raw, arw, png, psd, gpr, gif, tiff, tif, dng, insp
//! - Videos: mp4, avi, m4v, mov, insv
//! - Sidecars (opt-in): xmp, on1, xml
//!
//! Thumbnail cache directories (`@eaDir`, `thumbnails`) are never entered.
//!
//! ## Example
//! ```rust,ignore
//! use media_sorter::core::scanner::{MediaScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let found = scanner.scan(&["/Volumes/SDCARD".into()]);
//! ```

mod filter;
mod walker;

pub use filter::{MediaFilter, SKIPPED_DIRECTORIES};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::core::media::MediaItem;
use crate::core::organize::canonical_dir;
use crate::error::ScanError;
use crate::events::EventSender;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Result of a scan operation
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Media files found, in no particular order
    pub paths: Vec<PathBuf>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    fn merge(mut self, other: ScanResult) -> Self {
        self.paths.extend(other.paths);
        self.errors.extend(other.errors);
        self
    }
}

/// Trait for media scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait MediaScanner: Send + Sync {
    /// Recursively scan each root. Roots that do not exist are recorded as
    /// errors and contribute no paths.
    fn scan(&self, roots: &[PathBuf]) -> ScanResult;

    /// Scan with progress reporting via events
    fn scan_with_events(&self, roots: &[PathBuf], events: &EventSender) -> ScanResult;
}

/// Destination directories a batch of items would be placed into.
///
/// Only directories that already exist are returned, each once. Scanning
/// these instead of the whole destination keeps the cost proportional to the
/// batch rather than to the library.
pub fn scoped_roots<'a, I>(destination: &Path, items: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = &'a MediaItem>,
{
    items
        .into_iter()
        .map(|item| canonical_dir(destination, item.taken))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|dir| dir.is_dir())
        .collect()
}
