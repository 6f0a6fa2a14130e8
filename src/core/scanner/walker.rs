//! Directory walking implementation using walkdir.

use super::{filter::MediaFilter, MediaScanner, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether sidecar files are included
    pub include_sidecars: bool,
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: MediaFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = MediaFilter::new().with_sidecars(config.include_sidecars);
        Self { config, filter }
    }

    fn is_skipped(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(MediaFilter::is_skipped_directory)
                .unwrap_or(false)
    }

    /// Regular files, plus symlinks that resolve to one. Symlinked
    /// directories are not descended into.
    fn is_file(entry: &DirEntry) -> bool {
        entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
    }

    /// Scan a single directory tree
    fn scan_directory(&self, root: &Path, events: &EventSender) -> ScanResult {
        if !root.is_dir() {
            return ScanResult {
                paths: Vec::new(),
                errors: vec![ScanError::DirectoryNotFound {
                    path: root.to_path_buf(),
                }],
            };
        }

        let mut result = ScanResult::default();

        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| !Self::is_skipped(entry));

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    if !Self::is_file(&entry) {
                        if entry.path_is_symlink() {
                            info!("{}\tskipping, link does not point to a file", entry.path().display());
                        }
                        continue;
                    }

                    let path = entry.path();
                    if self.filter.should_include(path) {
                        result.paths.push(entry.into_path());
                    } else {
                        info!("{}\tskipping, unrecognized filetype", path.display());
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                        }
                    };

                    warn!("{}\t{}", path.display(), error);
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    result.errors.push(error);
                }
            }
        }

        result
    }
}

impl MediaScanner for WalkDirScanner {
    fn scan(&self, roots: &[PathBuf]) -> ScanResult {
        self.scan_with_events(roots, &crate::events::null_sender())
    }

    fn scan_with_events(&self, roots: &[PathBuf], events: &EventSender) -> ScanResult {
        events.send(Event::Scan(ScanEvent::Started {
            roots: roots.to_vec(),
        }));

        let result = roots
            .par_iter()
            .map(|root| self.scan_directory(root, events))
            .reduce(ScanResult::default, ScanResult::merge);

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: result.paths.len(),
        }));

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    fn names(result: &ScanResult) -> Vec<String> {
        let mut names: Vec<String> = result
            .paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = WalkDirScanner::new(ScanConfig::default());

        let result = scanner.scan(&[temp_dir.path().to_path_buf()]);

        assert!(result.paths.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn scan_traverses_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "root.jpg");
        touch(temp_dir.path(), "trip/day1/clip.MOV");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[temp_dir.path().to_path_buf()]);

        assert_eq!(names(&result), vec!["clip.MOV", "root.jpg"]);
    }

    #[test]
    fn scan_excludes_unrecognized_files() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "photo.jpg");
        touch(temp_dir.path(), "document.pdf");
        touch(temp_dir.path(), "IMG_0001.xmp");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[temp_dir.path().to_path_buf()]);

        assert_eq!(names(&result), vec!["photo.jpg"]);
    }

    #[test]
    fn scan_can_include_sidecars() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "photo.jpg");
        touch(temp_dir.path(), "photo.xmp");

        let config = ScanConfig {
            include_sidecars: true,
            ..Default::default()
        };
        let result = WalkDirScanner::new(config).scan(&[temp_dir.path().to_path_buf()]);

        assert_eq!(names(&result), vec!["photo.jpg", "photo.xmp"]);
    }

    #[test]
    fn scan_skips_cache_directories() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "keep.jpg");
        touch(temp_dir.path(), "@eaDir/keep.jpg/SYNOPHOTO_THUMB_XL.jpg");
        touch(temp_dir.path(), "album/thumbnails/small.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[temp_dir.path().to_path_buf()]);

        assert_eq!(names(&result), vec!["keep.jpg"]);
    }

    #[test]
    fn scan_multiple_roots_combines_results() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(first.path(), "a.jpg");
        touch(second.path(), "b.png");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[first.path().to_path_buf(), second.path().to_path_buf()]);

        assert_eq!(names(&result), vec!["a.jpg", "b.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn scan_follows_symlinked_files_but_not_dangling_links() {
        let temp_dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let target = touch(elsewhere.path(), "real.jpg");
        std::os::unix::fs::symlink(&target, temp_dir.path().join("IMG_0001.jpg")).unwrap();
        std::os::unix::fs::symlink(elsewhere.path().join("gone.jpg"), temp_dir.path().join("IMG_0002.jpg"))
            .unwrap();

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[temp_dir.path().to_path_buf()]);

        assert_eq!(names(&result), vec!["IMG_0001.jpg"]);
        assert!(result.errors.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_reported_and_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.jpg");
        touch(temp_dir.path(), "open/b.jpg");
        touch(temp_dir.path(), "locked/c.jpg");
        let locked = temp_dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not restrict root
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[temp_dir.path().to_path_buf()]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(names(&result), vec!["a.jpg", "b.jpg"]);
        assert!(matches!(
            result.errors.as_slice(),
            [ScanError::PermissionDenied { .. }]
        ));
    }

    #[test]
    fn scan_nonexistent_directory_records_error() {
        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[PathBuf::from("/nonexistent/path/12345")]);

        assert!(result.paths.is_empty());
        assert!(matches!(
            result.errors.as_slice(),
            [ScanError::DirectoryNotFound { .. }]
        ));
    }
}
