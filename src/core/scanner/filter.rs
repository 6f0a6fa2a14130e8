//! File filtering logic for the scanner.

use crate::core::media::MediaKind;
use std::path::Path;

/// Directory names that are never descended into: Synology thumbnail
/// caches and generic thumbnail folders
pub const SKIPPED_DIRECTORIES: &[&str] = &["@eaDir", "thumbnails"];

/// Decides which files are media the sorter handles
#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    /// Whether sidecar files (.xmp, .on1, .xml) are included
    include_sidecars: bool,
}

impl MediaFilter {
    /// Create a filter for photos and videos only
    pub fn new() -> Self {
        Self::default()
    }

    /// Also accept sidecar files
    pub fn with_sidecars(mut self, include: bool) -> Self {
        self.include_sidecars = include;
        self
    }

    /// Category of the file, or `None` when it should be skipped
    pub fn classify(&self, path: &Path) -> Option<MediaKind> {
        match MediaKind::from_path(path)? {
            MediaKind::Sidecar if !self.include_sidecars => None,
            kind => Some(kind),
        }
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        self.classify(path).is_some()
    }

    /// Whether a directory with this name is skipped
    pub fn is_skipped_directory(name: &str) -> bool {
        SKIPPED_DIRECTORIES.contains(&name)
    }
}
