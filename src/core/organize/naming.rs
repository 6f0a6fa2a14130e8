//! Collision-safe naming inside the destination tree.

use std::collections::{HashMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Hands out destination paths that collide neither with files on disk nor
/// with paths already handed out during this run.
///
/// A taken `name.ext` becomes `name_1.ext`, then `name_2.ext`, always built
/// from the base stem so suffixes never compound. Names are handled as raw
/// OS strings, so bytes that are not valid UTF-8 survive untouched.
#[derive(Debug, Default)]
pub struct NameReservations {
    claimed: HashSet<PathBuf>,
    // Next suffix to try per (directory, stem, extension)
    counters: HashMap<(PathBuf, OsString, Option<OsString>), usize>,
}

impl NameReservations {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_taken(&self, path: &Path) -> bool {
        self.claimed.contains(path) || path.exists()
    }

    /// Reserve a free path for `name` inside `dir`
    pub fn claim(&mut self, dir: &Path, name: impl AsRef<OsStr>) -> PathBuf {
        let name = name.as_ref();
        let candidate = dir.join(name);
        if !self.is_taken(&candidate) {
            self.claimed.insert(candidate.clone());
            return candidate;
        }

        let as_path = Path::new(name);
        let stem = as_path.file_stem().unwrap_or(name).to_os_string();
        let ext = as_path.extension().map(OsStr::to_os_string);

        let key = (dir.to_path_buf(), stem, ext);
        let mut counter = self.counters.get(&key).copied().unwrap_or(1);

        let unique = loop {
            let path = dir.join(suffixed(&key.1, counter, key.2.as_deref()));
            counter += 1;
            if !self.is_taken(&path) {
                break path;
            }
        };

        self.counters.insert(key, counter);
        self.claimed.insert(unique.clone());
        unique
    }

    /// Record a path written without going through the naming policy
    pub fn mark(&mut self, path: &Path) {
        self.claimed.insert(path.to_path_buf());
    }

    /// Whether `path` has been handed out or marked in this run
    pub fn is_claimed(&self, path: &Path) -> bool {
        self.claimed.contains(path)
    }
}

fn suffixed(stem: &OsStr, counter: usize, ext: Option<&OsStr>) -> OsString {
    let mut name = stem.to_os_string();
    name.push(format!("_{counter}"));
    if let Some(ext) = ext {
        name.push(".");
        name.push(ext);
    }
    name
}
