//! Executes transfers and relocations against the destination tree.

use super::layout::{canonical_dir, duplicates_dir};
use super::naming::NameReservations;
use crate::core::dedup::{Relocation, Target, Transfer};
use crate::error::PlacementError;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of a successful transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placed {
    /// Copied to a fresh, collision-safe path
    Copied(PathBuf),
    /// Overwrote an existing copy in place
    Replaced(PathBuf),
}

/// Result of a successful relocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocated {
    /// Already at its canonical path, nothing touched
    AlreadyInPlace,
    Moved(PathBuf),
}

/// Writes into one destination root.
///
/// Keeps the directories it created and the names it handed out for the
/// lifetime of a run. In dry-run mode every decision is logged and nothing on
/// disk changes.
pub struct Placer {
    root: PathBuf,
    dry_run: bool,
    created_dirs: HashSet<PathBuf>,
    names: NameReservations,
}

impl Placer {
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
            created_dirs: HashSet::new(),
            names: NameReservations::new(),
        }
    }

    /// Directories created so far
    pub fn folders_created(&self) -> usize {
        self.created_dirs.len()
    }

    /// Copy one source item into the destination tree
    pub fn transfer(&mut self, transfer: &Transfer) -> Result<Placed, PlacementError> {
        let item = &transfer.item;

        let dir = match &transfer.target {
            Target::Replace(existing) => {
                info!("{}\treplacing\t{}", item.path.display(), existing.display());
                self.names.mark(existing);
                if !self.dry_run {
                    if let Some(parent) = existing.parent() {
                        self.ensure_dir(parent)?;
                    }
                    copy_preserving_times(&item.path, existing)?;
                }
                return Ok(Placed::Replaced(existing.clone()));
            }
            Target::Canonical => canonical_dir(&self.root, item.taken),
            Target::Duplicates => duplicates_dir(&self.root, item.taken),
        };

        self.ensure_dir(&dir)?;
        let to = self.names.claim(&dir, &item.name);
        info!("{}\tcopying to\t{}", item.path.display(), to.display());

        if !self.dry_run {
            copy_preserving_times(&item.path, &to)?;
        }
        Ok(Placed::Copied(to))
    }

    /// Move a destination item to its canonical location
    pub fn relocate(&mut self, relocation: &Relocation) -> Result<Relocated, PlacementError> {
        let item = &relocation.item;
        let dir = canonical_dir(&self.root, item.taken);

        if dir.join(&item.name) == item.path
            && item.fingerprint == relocation.counterpart.fingerprint
        {
            info!("{}\tis already in the correct location", item.path.display());
            return Ok(Relocated::AlreadyInPlace);
        }

        self.ensure_dir(&dir)?;
        let to = self.names.claim(&dir, &item.name);
        info!("{}\tmoving to\t{}", item.path.display(), to.display());

        if !self.dry_run {
            move_file(&item.path, &to)?;
        }
        Ok(Relocated::Moved(to))
    }

    fn ensure_dir(&mut self, dir: &Path) -> Result<(), PlacementError> {
        if self.dry_run || self.created_dirs.contains(dir) {
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|source| PlacementError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        self.created_dirs.insert(dir.to_path_buf());
        Ok(())
    }
}

/// Copy `from` to `to`, flush it to disk, then carry over the access and
/// modification times of `from`
pub fn copy_preserving_times(from: &Path, to: &Path) -> Result<(), PlacementError> {
    let copy_error = |source| PlacementError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    let times_error = |source| PlacementError::Timestamps {
        path: to.to_path_buf(),
        source,
    };

    let mut input = File::open(from).map_err(copy_error)?;
    let mut output = File::create(to).map_err(copy_error)?;
    io::copy(&mut input, &mut output).map_err(copy_error)?;
    output.sync_all().map_err(copy_error)?;

    let metadata = input.metadata().map_err(times_error)?;
    let times = fs::FileTimes::new()
        .set_accessed(metadata.accessed().map_err(times_error)?)
        .set_modified(metadata.modified().map_err(times_error)?);
    output.set_times(times).map_err(times_error)?;

    Ok(())
}

/// Rename, falling back to a verified copy and delete across filesystems
fn move_file(from: &Path, to: &Path) -> Result<(), PlacementError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    let rename_error = |source| PlacementError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let expected = fs::metadata(from).map_err(rename_error)?.len();
    copy_preserving_times(from, to)?;

    let written = fs::metadata(to).map_err(rename_error)?.len();
    if written != expected {
        let _ = fs::remove_file(to);
        return Err(rename_error(io::Error::new(
            io::ErrorKind::Other,
            format!("copy verification failed: source {expected} bytes, destination {written} bytes"),
        )));
    }

    fs::remove_file(from).map_err(rename_error)
}
