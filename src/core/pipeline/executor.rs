//! Pipeline execution implementation.

use crate::core::dedup::{self, DuplicateMode, Target};
use crate::core::hasher::DEFAULT_PREFIX_LIMIT;
use crate::core::metadata::{ExifTool, ResolverChain};
use crate::core::organize::{Placed, Placer, Relocated};
use crate::core::pool::{FingerprintPool, PoolConfig, DEFAULT_WORKERS};
use crate::core::scanner::{scoped_roots, MediaScanner, ScanConfig, WalkDirScanner};
use crate::error::{OrganizerError, PlacementError, ScanError};
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
    TransferEvent, TransferProgress,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

/// Default destination root
pub const DEFAULT_DESTINATION: &str = "./photos";

/// Photos and videos smaller than this are "tiny"
pub const DEFAULT_TINY_THRESHOLD: u64 = 50_000;

/// How much of the destination is fingerprinted for duplicate detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationScan {
    /// Only the date directories the source batch maps to
    #[default]
    Scoped,
    /// The entire destination tree
    Full,
}

/// Configuration for one run, fixed once built
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub duplicates: DuplicateMode,
    /// Drop photos/videos below `tiny_threshold` from the source batch
    pub skip_tiny_files: bool,
    pub tiny_threshold: u64,
    /// Log every decision, change nothing
    pub dry_run: bool,
    pub scan_scope: DestinationScan,
    pub include_sidecars: bool,
    /// Log timings of the expensive steps
    pub analyze: bool,
    /// Worker pool width
    pub workers: usize,
    /// Bytes hashed per file
    pub prefix_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            duplicates: DuplicateMode::default(),
            skip_tiny_files: false,
            tiny_threshold: DEFAULT_TINY_THRESHOLD,
            dry_run: false,
            scan_scope: DestinationScan::default(),
            include_sidecars: false,
            analyze: false,
            workers: DEFAULT_WORKERS,
            prefix_limit: DEFAULT_PREFIX_LIMIT,
        }
    }
}

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    resolver: Option<ResolverChain>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory to ingest
    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.config.source = source.into();
        self
    }

    /// Root of the date-structured library
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.config.destination = destination.into();
        self
    }

    pub fn duplicates(mut self, mode: DuplicateMode) -> Self {
        self.config.duplicates = mode;
        self
    }

    pub fn skip_tiny_files(mut self, skip: bool) -> Self {
        self.config.skip_tiny_files = skip;
        self
    }

    pub fn tiny_threshold(mut self, bytes: u64) -> Self {
        self.config.tiny_threshold = bytes;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    pub fn scan_scope(mut self, scope: DestinationScan) -> Self {
        self.config.scan_scope = scope;
        self
    }

    pub fn include_sidecars(mut self, include: bool) -> Self {
        self.config.include_sidecars = include;
        self
    }

    pub fn analyze(mut self, analyze: bool) -> Self {
        self.config.analyze = analyze;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers.max(1);
        self
    }

    pub fn prefix_limit(mut self, bytes: usize) -> Self {
        self.config.prefix_limit = bytes;
        self
    }

    /// Use an explicit timestamp chain instead of probing for exiftool
    pub fn resolver(mut self, resolver: ResolverChain) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            resolver: self
                .resolver
                .unwrap_or_else(|| ResolverChain::standard(ExifTool::detect())),
        }
    }
}

/// The sort pipeline
pub struct Pipeline {
    config: PipelineConfig,
    resolver: ResolverChain,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineSummary, OrganizerError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Only environment problems return `Err`. Per-item failures are logged
    /// and counted in the summary.
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineSummary, OrganizerError> {
        let start_time = Instant::now();
        let config = &self.config;
        let mut summary = PipelineSummary {
            run_id: Uuid::new_v4().to_string(),
            dry_run: config.dry_run,
            ..Default::default()
        };

        events.send(Event::Pipeline(PipelineEvent::Started {
            dry_run: config.dry_run,
        }));

        if !config.dry_run {
            fs::create_dir_all(&config.destination).map_err(|source| {
                PlacementError::CreateDir {
                    path: config.destination.clone(),
                    source,
                }
            })?;
        }

        if !config.source.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: config.source.clone(),
            }
            .into());
        }

        let scanner = WalkDirScanner::new(ScanConfig {
            include_sidecars: config.include_sidecars,
            ..Default::default()
        });

        // Source
        self.phase(events, PipelinePhase::ScanningSource);
        let found = scanner.scan_with_events(std::slice::from_ref(&config.source), events);
        summary.scanned = found.paths.len();

        self.phase(events, PipelinePhase::FingerprintingSource);
        let timer = Instant::now();
        let source_pool = FingerprintPool::new(self.pool_config(true), &self.resolver);
        let outcome = source_pool.run(found.paths, events);
        self.track(timer, "source fingerprinting");
        summary.failures += outcome.failures;
        let mut source_index = outcome.index;
        summary.fingerprinted = source_index.len();

        if config.skip_tiny_files {
            let before = source_index.len();
            source_index.retain(|item| {
                let tiny = item.is_tiny(config.tiny_threshold);
                if tiny {
                    info!("{}\tskipping too small {}", item.path.display(), item.kind);
                }
                !tiny
            });
            summary.tiny_skipped = before - source_index.len();
        }

        // Destination
        self.phase(events, PipelinePhase::ScanningDestination);
        let roots = match config.scan_scope {
            DestinationScan::Full if config.destination.is_dir() => vec![config.destination.clone()],
            DestinationScan::Full => Vec::new(),
            DestinationScan::Scoped => scoped_roots(&config.destination, source_index.values()),
        };
        let existing = scanner.scan_with_events(&roots, events);
        summary.destination_scanned = existing.paths.len();

        self.phase(events, PipelinePhase::FingerprintingDestination);
        let timer = Instant::now();
        let destination_pool = FingerprintPool::new(
            self.pool_config(config.duplicates.needs_destination_dates()),
            &self.resolver,
        );
        let outcome = destination_pool.run(existing.paths, events);
        self.track(timer, "destination fingerprinting");
        summary.failures += outcome.failures;

        // Decisions
        self.phase(events, PipelinePhase::Deduplicating);
        let plan = dedup::plan(source_index, outcome.index, config.duplicates);
        summary.skipped_duplicates = plan.skipped;

        if plan.is_empty() {
            info!("No new files to copy or move.");
            return Ok(self.finish(summary, start_time, events));
        }

        let mut placer = Placer::new(&config.destination, config.dry_run);

        if !plan.transfers.is_empty() {
            self.phase(events, PipelinePhase::Copying);
            let total = plan.transfers.len();
            events.send(Event::Transfer(TransferEvent::Started { total }));

            for (i, transfer) in plan.transfers.iter().enumerate() {
                match placer.transfer(transfer) {
                    Ok(Placed::Replaced(_)) => summary.replaced += 1,
                    Ok(Placed::Copied(_)) if transfer.target == Target::Duplicates => {
                        summary.copied_to_duplicates += 1
                    }
                    Ok(Placed::Copied(_)) => summary.copied += 1,
                    Err(e) => {
                        error!("{}\t{}", transfer.item.path.display(), e);
                        summary.failures += 1;
                    }
                }

                events.send(Event::Transfer(TransferEvent::Progress(TransferProgress {
                    completed: i + 1,
                    total,
                    current_path: transfer.item.path.clone(),
                })));
            }
            events.send(Event::Transfer(TransferEvent::Completed));
        }

        if !plan.relocations.is_empty() {
            self.phase(events, PipelinePhase::Relocating);
            let total = plan.relocations.len();
            events.send(Event::Transfer(TransferEvent::Started { total }));

            for (i, relocation) in plan.relocations.iter().enumerate() {
                match placer.relocate(relocation) {
                    Ok(Relocated::Moved(_)) => summary.relocated += 1,
                    Ok(Relocated::AlreadyInPlace) => summary.already_in_place += 1,
                    Err(e) => {
                        error!("{}\t{}", relocation.item.path.display(), e);
                        summary.failures += 1;
                    }
                }

                events.send(Event::Transfer(TransferEvent::Progress(TransferProgress {
                    completed: i + 1,
                    total,
                    current_path: relocation.item.path.clone(),
                })));
            }
            events.send(Event::Transfer(TransferEvent::Completed));
        }

        Ok(self.finish(summary, start_time, events))
    }

    fn pool_config(&self, resolve_dates: bool) -> PoolConfig {
        PoolConfig {
            workers: self.config.workers,
            prefix_limit: self.config.prefix_limit,
            resolve_dates,
            tiny_threshold: self
                .config
                .skip_tiny_files
                .then_some(self.config.tiny_threshold),
            analyze: self.config.analyze,
        }
    }

    fn phase(&self, events: &EventSender, phase: PipelinePhase) {
        info!("{}...", phase);
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }

    fn track(&self, started: Instant, name: &str) {
        if self.config.analyze {
            info!("{} took {:?}", name, started.elapsed());
        }
    }

    fn finish(
        &self,
        mut summary: PipelineSummary,
        start_time: Instant,
        events: &EventSender,
    ) -> PipelineSummary {
        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: summary.clone(),
        }));
        summary
    }
}
