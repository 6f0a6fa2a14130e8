//! Capture date from filesystem timestamps, the last resort of the chain.

use super::TimestampStrategy;
use crate::core::media::MediaKind;
use crate::error::MetadataError;
use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tracing::warn;

/// Birth time when the platform reports one and it predates the
/// modification time, otherwise the modification time
pub struct FileTimes;

impl FileTimes {
    /// Pick the earlier of birth and modify time, birth being optional
    pub fn choose(created: Option<SystemTime>, modified: SystemTime) -> SystemTime {
        match created {
            Some(created) if created < modified => created,
            _ => modified,
        }
    }

    fn to_local(time: SystemTime) -> NaiveDateTime {
        DateTime::<Local>::from(time).naive_local()
    }
}

impl TimestampStrategy for FileTimes {
    fn name(&self) -> &'static str {
        "filesystem timestamps"
    }

    fn applies_to(&self, _kind: MediaKind) -> bool {
        true
    }

    // A failure here stays with this item: it goes undated, the run goes on
    fn resolve(&self, path: &Path) -> Result<NaiveDateTime, MetadataError> {
        let metadata = fs::metadata(path).map_err(MetadataError::FileTimes)?;
        let modified = metadata.modified().map_err(MetadataError::FileTimes)?;
        Ok(Self::to_local(Self::choose(metadata.created().ok(), modified)))
    }

    fn announce_fallback(&self, path: &Path, kind: MediaKind) {
        if matches!(kind, MediaKind::Photo | MediaKind::Video) {
            warn!("{}\tNo EXIF data found, using file mod time", path.display());
        }
    }
}
