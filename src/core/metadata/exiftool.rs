//! Capture date from the external `exiftool` utility.
//!
//! exiftool is run once per file with its default human-readable output:
//! one tag per line, the tag name padded to 32 columns, then `: value`.

use super::TimestampStrategy;
use crate::core::media::MediaKind;
use crate::error::MetadataError;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::warn;

/// Date-bearing tags, most trustworthy first (spaces removed from names)
pub const DATE_TAG_PRIORITY: &[&str] = &[
    "DateAndTimeOriginal",
    "DateTimeOriginal",
    "Date/TimeOriginal",
    "DateTaken",
    "CreateDate",
    "MediaCreateDate",
    "TrackCreateDate",
    "ModifyDate",
    "FileModificationDateTime",
    "FileAccessDateTime",
    "EncodedDate",
    "TaggedDate",
];

const TAG_COLUMN_WIDTH: usize = 32;

/// Handle on an exiftool executable
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
    date_pattern: Regex,
}

impl ExifTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            date_pattern: Regex::new(r"(\d{4}):(\d{2}):(\d{2}) (\d{2}):(\d{2}):(\d{2})").unwrap(),
        }
    }

    /// Probe for `exiftool` on the PATH.
    ///
    /// Returns `None` and logs a warning when it cannot be run, in which
    /// case dates come from embedded EXIF and filesystem timestamps only.
    pub fn detect() -> Option<Self> {
        Self::detect_program("exiftool")
    }

    pub fn detect_program(program: impl Into<PathBuf>) -> Option<Self> {
        let tool = Self::new(program);
        let probe = Command::new(&tool.program)
            .arg("-ver")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match probe {
            Ok(status) if status.success() => Some(tool),
            _ => {
                warn!(
                    "{} is not installed; for more accurate timestamps install it and make sure it is on your PATH: https://exiftool.org/install.html",
                    tool.program.display()
                );
                None
            }
        }
    }

    /// Run exiftool on one file and collect its tags
    pub fn tags(&self, path: &Path) -> Result<HashMap<String, String>, MetadataError> {
        let output = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(MetadataError::ExifToolSpawn)?;

        if !output.status.success() {
            return Err(MetadataError::ExifToolStatus {
                status: output.status,
            });
        }

        Ok(parse_tags(&String::from_utf8_lossy(&output.stdout)))
    }

    /// First tag in priority order holding a date with a nonzero year.
    ///
    /// A tag whose value does not parse does not end the search.
    pub fn date_from_tags(&self, tags: &HashMap<String, String>) -> Option<NaiveDateTime> {
        DATE_TAG_PRIORITY
            .iter()
            .filter_map(|tag| tags.get(*tag))
            .find_map(|value| self.parse_date(value))
    }

    fn parse_date(&self, value: &str) -> Option<NaiveDateTime> {
        let caps = self.date_pattern.captures(value)?;
        let field = |i: usize| caps[i].parse::<u32>().ok();

        let year = caps[1].parse::<i32>().ok().filter(|y| *y != 0)?;
        NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?.and_hms_opt(
            field(4)?,
            field(5)?,
            field(6)?,
        )
    }
}

/// Split exiftool output into a tag map.
///
/// The first 32 characters hold the tag name (interior spaces removed),
/// the rest holds the value. Lines too short to contain a value are ignored.
pub fn parse_tags(output: &str) -> HashMap<String, String> {
    output
        .trim_matches(|c| c == ' ' || c == '\r' || c == '\n')
        .lines()
        .filter_map(|line| {
            let split = line.char_indices().nth(TAG_COLUMN_WIDTH).map(|(i, _)| i)?;
            let (name, rest) = line.split_at(split);
            let key: String = name.trim().chars().filter(|c| *c != ' ').collect();
            let value = rest.trim_start_matches(':').trim();
            if key.is_empty() {
                None
            } else {
                Some((key, value.to_string()))
            }
        })
        .collect()
}

impl TimestampStrategy for ExifTool {
    fn name(&self) -> &'static str {
        "exiftool"
    }

    fn applies_to(&self, kind: MediaKind) -> bool {
        matches!(kind, MediaKind::Photo | MediaKind::Video)
    }

    // Every invocation is logged, videos included
    fn always_announces(&self) -> bool {
        true
    }

    fn resolve(&self, path: &Path) -> Result<NaiveDateTime, MetadataError> {
        let tags = self.tags(path)?;
        self.date_from_tags(&tags).ok_or(MetadataError::NoDateTag)
    }
}
