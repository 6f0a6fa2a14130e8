//! # Media Module
//!
//! The data model shared by every stage: media categories, content
//! fingerprints, fingerprinted items and the fingerprint index.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::{self, HashMap};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Photo extensions (matched case-insensitively)
pub const PHOTO_EXTENSIONS: &[&str] = &[
    "heic", "jpeg", "jpg", "raw", "arw", "png", "psd", "gpr", "gif", "tiff", "tif", "dng", "insp",
];

/// Video extensions (matched case-insensitively)
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "m4v", "mov", "insv"];

/// Sidecar extensions, only processed when explicitly enabled
pub const SIDECAR_EXTENSIONS: &[&str] = &["xmp", "on1", "xml"];

/// Category of a media file, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Sidecar,
}

impl MediaKind {
    /// Detect the category from a bare extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        let ext = ext.as_str();
        if PHOTO_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Photo)
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Video)
        } else if SIDECAR_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Sidecar)
        } else {
            None
        }
    }

    /// Detect the category of a path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Photo => write!(f, "photo"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Sidecar => write!(f, "sidecar"),
        }
    }
}

/// Fixed-width content digest over a bounded prefix of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// A fingerprinted media file.
///
/// Created once by a pool worker. Only `taken` and `replace` change after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Where the file currently lives
    pub path: PathBuf,
    /// File name used when placing the file, byte-for-byte as found
    pub name: OsString,
    /// Content identity
    pub fingerprint: Fingerprint,
    /// Full size in bytes (not just the hashed prefix)
    pub size: u64,
    pub kind: MediaKind,
    /// Resolved capture time, `None` when every strategy failed
    pub taken: Option<NaiveDateTime>,
    /// Overwrite an existing, smaller destination copy instead of renaming
    pub replace: bool,
}

impl MediaItem {
    pub fn is_photo(&self) -> bool {
        self.kind == MediaKind::Photo
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// Photos and videos below `threshold` bytes. Sidecars are never tiny.
    pub fn is_tiny(&self, threshold: u64) -> bool {
        (self.is_photo() || self.is_video()) && self.size < threshold
    }
}

/// Mapping of fingerprint to item, one entry per distinct content value.
///
/// Inserting an item whose fingerprint is already present replaces the
/// earlier item.
#[derive(Debug, Clone, Default)]
pub struct FingerprintIndex {
    items: HashMap<Fingerprint, MediaItem>,
}

impl FingerprintIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, returning the item it displaced (if any)
    pub fn insert(&mut self, item: MediaItem) -> Option<MediaItem> {
        self.items.insert(item.fingerprint, item)
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&MediaItem> {
        self.items.get(fingerprint)
    }

    pub fn remove(&mut self, fingerprint: &Fingerprint) -> Option<MediaItem> {
        self.items.remove(fingerprint)
    }

    /// Keep only the items for which `keep` returns true
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&MediaItem) -> bool,
    {
        self.items.retain(|_, item| keep(item));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, Fingerprint, MediaItem> {
        self.items.iter()
    }

    pub fn values(&self) -> hash_map::Values<'_, Fingerprint, MediaItem> {
        self.items.values()
    }
}

impl FromIterator<MediaItem> for FingerprintIndex {
    fn from_iter<I: IntoIterator<Item = MediaItem>>(iter: I) -> Self {
        let mut index = FingerprintIndex::new();
        for item in iter {
            index.insert(item);
        }
        index
    }
}

impl IntoIterator for FingerprintIndex {
    type Item = (Fingerprint, MediaItem);
    type IntoIter = hash_map::IntoIter<Fingerprint, MediaItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, fingerprint: u8, size: u64, kind: MediaKind) -> MediaItem {
        MediaItem {
            path: PathBuf::from("/src").join(name),
            name: name.into(),
            fingerprint: Fingerprint::from_bytes([fingerprint; 16]),
            size,
            kind,
            taken: None,
            replace: false,
        }
    }

    #[test]
    fn kind_from_extension_is_case_insensitive() {
        assert_eq!(MediaKind::from_extension("JPG"), Some(MediaKind::Photo));
        assert_eq!(MediaKind::from_extension("Heic"), Some(MediaKind::Photo));
        assert_eq!(MediaKind::from_extension("MOV"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("insv"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("XMP"), Some(MediaKind::Sidecar));
        assert_eq!(MediaKind::from_extension("pdf"), None);
    }

    #[test]
    fn kind_from_path_without_extension() {
        assert_eq!(MediaKind::from_path(Path::new("/photos/README")), None);
        assert_eq!(
            MediaKind::from_path(Path::new("/photos/IMG_0001.DNG")),
            Some(MediaKind::Photo)
        );
    }

    #[test]
    fn fingerprint_displays_as_hex() {
        let fp = Fingerprint::from_bytes([0xab; 16]);
        assert_eq!(fp.to_string(), "ab".repeat(16));
    }

    #[test]
    fn tiny_applies_to_photos_and_videos_only() {
        assert!(item("a.jpg", 1, 10, MediaKind::Photo).is_tiny(50_000));
        assert!(item("a.mp4", 1, 10, MediaKind::Video).is_tiny(50_000));
        assert!(!item("a.xmp", 1, 10, MediaKind::Sidecar).is_tiny(50_000));
        assert!(!item("a.jpg", 1, 50_000, MediaKind::Photo).is_tiny(50_000));
    }

    #[test]
    fn index_last_insert_wins() {
        let mut index = FingerprintIndex::new();
        assert!(index.insert(item("first.jpg", 7, 100, MediaKind::Photo)).is_none());
        let displaced = index.insert(item("second.jpg", 7, 100, MediaKind::Photo));

        assert_eq!(displaced.unwrap().name, "first.jpg");
        assert_eq!(index.len(), 1);
        let fp = Fingerprint::from_bytes([7; 16]);
        assert_eq!(index.get(&fp).unwrap().name, "second.jpg");
    }
}
