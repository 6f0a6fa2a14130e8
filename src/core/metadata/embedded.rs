//! Capture date from EXIF data embedded in the file itself.

use super::TimestampStrategy;
use crate::core::media::MediaKind;
use crate::error::MetadataError;
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads `DateTimeOriginal`, then `DateTime`, from embedded EXIF
pub struct EmbeddedExif;

impl EmbeddedExif {
    /// Parse an EXIF date value ("YYYY:MM:DD HH:MM:SS")
    pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
        let s = raw.trim_matches(|c: char| c == '"' || c == '\0' || c.is_whitespace());
        NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .ok()
    }
}

impl TimestampStrategy for EmbeddedExif {
    fn name(&self) -> &'static str {
        "embedded exif"
    }

    fn applies_to(&self, kind: MediaKind) -> bool {
        kind == MediaKind::Photo
    }

    fn resolve(&self, path: &Path) -> Result<NaiveDateTime, MetadataError> {
        let file = File::open(path).map_err(|e| MetadataError::Exif(e.to_string()))?;
        let mut reader = BufReader::new(file);
        let exif = Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| MetadataError::Exif(e.to_string()))?;

        [Tag::DateTimeOriginal, Tag::DateTime]
            .into_iter()
            .filter_map(|tag| exif.get_field(tag, In::PRIMARY))
            .find_map(|field| match field.value {
                Value::Ascii(ref values) => values
                    .first()
                    .and_then(|bytes| std::str::from_utf8(bytes).ok())
                    .and_then(Self::parse_datetime),
                _ => None,
            })
            .ok_or(MetadataError::NoDateTag)
    }
}
