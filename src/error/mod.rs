//! # Error Module
//!
//! Error types for the media sorter.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Contain failures** - per-item errors are logged and counted, only
//!   environment problems stop a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Placement error: {0}")]
    Placement(#[from] PlacementError),

    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while enumerating media files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while reading a file to fingerprint it
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not accessible: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unrecognized file type: {path}")]
    UnsupportedType { path: PathBuf },
}

/// Reasons a single timestamp strategy produced no date.
///
/// These are expected steps of the fallback chain, not user-facing failures.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("No embedded EXIF data: {0}")]
    Exif(String),

    #[error("exiftool could not be run: {0}")]
    ExifToolSpawn(#[source] std::io::Error),

    #[error("exiftool exited with {status}")]
    ExifToolStatus { status: std::process::ExitStatus },

    #[error("No date-bearing tag found")]
    NoDateTag,

    #[error("Filesystem timestamps unavailable: {0}")]
    FileTimes(#[source] std::io::Error),
}

/// Errors that occur while writing into the destination tree
#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to carry timestamps over to {path}: {source}")]
    Timestamps {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/vacation"));
    }

    #[test]
    fn placement_error_names_both_ends() {
        let error = PlacementError::Copy {
            from: PathBuf::from("/card/DCIM/IMG_0001.JPG"),
            to: PathBuf::from("/library/2022/03/05/IMG_0001.JPG"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let message = error.to_string();
        assert!(message.contains("/card/DCIM/IMG_0001.JPG"));
        assert!(message.contains("/library/2022/03/05"));
        assert!(message.contains("disk full"));
    }

    #[test]
    fn log_file_error_converts_to_message() {
        let error = OrganizerError::LogFile {
            path: PathBuf::from("/readonly/transfer.log"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().contains("/readonly/transfer.log"));
    }
}
