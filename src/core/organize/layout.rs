//! Directory layout of the destination tree.

use chrono::{Datelike, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Bucket for items without a resolved capture date
pub const UNKNOWN_DIR: &str = "unknown";

/// Subtree that receives duplicates in copy-duplicates mode
pub const DUPLICATES_DIR: &str = "duplicates";

/// `YYYY/MM/DD` (zero-padded) for a date, `unknown` otherwise
pub fn date_folder(taken: Option<NaiveDateTime>) -> PathBuf {
    match taken {
        Some(t) => PathBuf::from(format!("{}", t.year()))
            .join(format!("{:02}", t.month()))
            .join(format!("{:02}", t.day())),
        None => PathBuf::from(UNKNOWN_DIR),
    }
}

/// Canonical directory for an item under `root`
pub fn canonical_dir(root: &Path, taken: Option<NaiveDateTime>) -> PathBuf {
    root.join(date_folder(taken))
}

/// Duplicate-routing directory for an item under `root`
pub fn duplicates_dir(root: &Path, taken: Option<NaiveDateTime>) -> PathBuf {
    root.join(DUPLICATES_DIR).join(date_folder(taken))
}
