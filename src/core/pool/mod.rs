//! # Pool Module
//!
//! Fixed-width worker pool that fingerprints a batch of files and, on
//! request, resolves their capture dates.
//!
//! ## Design
//! - Paths are queued up front on a channel sized to the batch.
//! - `workers` threads drain the queue. The width is an overcommit tunable:
//!   the work is bound by I/O and exiftool subprocesses, not CPU.
//! - Every worker sends exactly one result per path to a single consumer
//!   (the calling thread), which owns the [`FingerprintIndex`]. No locks.
//! - A failed item is logged and dropped; it never affects other items.

use crate::core::hasher::{fingerprint_file, Fingerprinted, DEFAULT_PREFIX_LIMIT};
use crate::core::media::{FingerprintIndex, MediaItem, MediaKind};
use crate::core::metadata::ResolverChain;
use crate::error::FingerprintError;
use crate::events::{Event, EventSender, FingerprintEvent, FingerprintProgress};
use crossbeam_channel::{bounded, unbounded};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info};

/// Default number of concurrent workers
pub const DEFAULT_WORKERS: usize = 100;

/// Settings for one pass of the pool
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Bytes hashed per file
    pub prefix_limit: usize,
    /// Run the timestamp chain for each item
    pub resolve_dates: bool,
    /// Photos/videos below this size get no timestamp resolution
    pub tiny_threshold: Option<u64>,
    /// Log per-item timings
    pub analyze: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            prefix_limit: DEFAULT_PREFIX_LIMIT,
            resolve_dates: true,
            tiny_threshold: None,
            analyze: false,
        }
    }
}

/// What a pass over a batch produced
#[derive(Debug, Default)]
pub struct PoolOutcome {
    /// One entry per distinct fingerprint
    pub index: FingerprintIndex,
    /// Files that could not be read
    pub failures: usize,
}

/// Fingerprinting and metadata worker pool
pub struct FingerprintPool<'a> {
    config: PoolConfig,
    resolver: &'a ResolverChain,
}

impl<'a> FingerprintPool<'a> {
    pub fn new(config: PoolConfig, resolver: &'a ResolverChain) -> Self {
        Self { config, resolver }
    }

    /// Build a media item for one file
    pub fn process_item(&self, path: &Path) -> Result<MediaItem, FingerprintError> {
        let kind = MediaKind::from_path(path).ok_or_else(|| FingerprintError::UnsupportedType {
            path: path.to_path_buf(),
        })?;

        let started = Instant::now();
        let Fingerprinted { fingerprint, size } = fingerprint_file(path, self.config.prefix_limit)?;
        if self.config.analyze {
            info!("{}\tfingerprint took {:?}", path.display(), started.elapsed());
        }

        let mut item = MediaItem {
            path: path.to_path_buf(),
            name: path.file_name().map(OsStr::to_os_string).unwrap_or_default(),
            fingerprint,
            size,
            kind,
            taken: None,
            replace: false,
        };

        if self.config.resolve_dates {
            let exempt = self
                .config
                .tiny_threshold
                .is_some_and(|threshold| item.is_tiny(threshold));

            if exempt {
                debug!("{}\ttoo small, not resolving a date", path.display());
            } else {
                let started = Instant::now();
                item.taken = self.resolver.resolve(path, kind);
                if self.config.analyze {
                    info!("{}\tmetadata took {:?}", path.display(), started.elapsed());
                }
            }
        }

        Ok(item)
    }

    /// Process a batch, returning once every path has a result
    pub fn run(&self, paths: Vec<PathBuf>, events: &EventSender) -> PoolOutcome {
        let total = paths.len();
        let mut outcome = PoolOutcome::default();
        if total == 0 {
            return outcome;
        }

        events.send(Event::Fingerprint(FingerprintEvent::Started { total }));

        let (job_tx, job_rx) = bounded::<PathBuf>(total);
        for path in paths {
            // Capacity equals the batch size, so this never blocks
            let _ = job_tx.send(path);
        }
        drop(job_tx);

        let (result_tx, result_rx) = unbounded();

        thread::scope(|scope| {
            for _ in 0..self.config.workers.max(1) {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                scope.spawn(move || {
                    for path in jobs.iter() {
                        let result = self.process_item(&path);
                        if results.send((path, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            for (done, (path, result)) in result_rx.iter().enumerate() {
                match result {
                    Ok(item) => {
                        if let Some(previous) = outcome.index.insert(item) {
                            debug!(
                                "{}\tsame content as {}",
                                path.display(),
                                previous.path.display()
                            );
                        }
                    }
                    Err(e) => {
                        error!("{}\t{}", path.display(), e);
                        outcome.failures += 1;
                        events.send(Event::Fingerprint(FingerprintEvent::Error {
                            path: path.clone(),
                            message: e.to_string(),
                        }));
                    }
                }

                events.send(Event::Fingerprint(FingerprintEvent::Progress(
                    FingerprintProgress {
                        completed: done + 1,
                        total,
                        current_path: path,
                    },
                )));
            }
        });

        events.send(Event::Fingerprint(FingerprintEvent::Completed {
            indexed: outcome.index.len(),
        }));

        outcome
    }
}
