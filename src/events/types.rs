//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the sorting pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Fingerprinting phase events
    Fingerprint(FingerprintEvent),
    /// Copy and relocation phase events
    Transfer(TransferEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { roots: Vec<PathBuf> },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_files: usize },
}

/// Events during the fingerprinting phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FingerprintEvent {
    /// A batch was handed to the worker pool
    Started { total: usize },
    /// One more result was collected
    Progress(FingerprintProgress),
    /// A file could not be read and was dropped
    Error { path: PathBuf, message: String },
    /// Every worker finished
    Completed { indexed: usize },
}

/// Progress information during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintProgress {
    /// Results collected so far, including failures
    pub completed: usize,
    /// Size of the batch
    pub total: usize,
    /// File whose result was just collected
    pub current_path: PathBuf,
}

/// Events while copying and relocating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransferEvent {
    Started { total: usize },
    Progress(TransferProgress),
    Completed,
}

/// Progress information while copying or relocating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferProgress {
    pub completed: usize,
    pub total: usize,
    pub current_path: PathBuf,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started { dry_run: bool },
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed
    Completed { summary: PipelineSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    ScanningSource,
    FingerprintingSource,
    ScanningDestination,
    FingerprintingDestination,
    Deduplicating,
    Copying,
    Relocating,
}

/// Summary of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Unique id of this run
    pub run_id: String,
    pub dry_run: bool,
    /// Media files found under the source
    pub scanned: usize,
    /// Distinct source fingerprints
    pub fingerprinted: usize,
    /// Source photos/videos dropped for being too small
    pub tiny_skipped: usize,
    /// Media files found in the destination
    pub destination_scanned: usize,
    /// Items copied to their canonical location
    pub copied: usize,
    /// Items copied into the duplicates tree
    pub copied_to_duplicates: usize,
    /// Source items already present in the destination
    pub skipped_duplicates: usize,
    /// Smaller destination copies overwritten
    pub replaced: usize,
    /// Destination items moved to their canonical location
    pub relocated: usize,
    /// Destination items already where they belong
    pub already_in_place: usize,
    /// Items whose read, copy or move failed
    pub failures: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::ScanningSource => write!(f, "Scanning source"),
            PipelinePhase::FingerprintingSource => write!(f, "Processing source files"),
            PipelinePhase::ScanningDestination => write!(f, "Scanning destination"),
            PipelinePhase::FingerprintingDestination => {
                write!(f, "Scanning destination for duplicates")
            }
            PipelinePhase::Deduplicating => write!(f, "Matching duplicates"),
            PipelinePhase::Copying => write!(f, "Copying new files"),
            PipelinePhase::Relocating => write!(f, "Moving existing files"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Fingerprint(FingerprintEvent::Progress(FingerprintProgress {
            completed: 10,
            total: 50,
            current_path: PathBuf::from("/card/IMG_0001.JPG"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Fingerprint(FingerprintEvent::Progress(p)) => {
                assert_eq!(p.completed, 10);
                assert_eq!(p.total, 50);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn pipeline_summary_is_serializable() {
        let summary = PipelineSummary {
            copied: 1000,
            replaced: 3,
            duration_ms: 5000,
            ..Default::default()
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"copied\":1000"));
    }

    #[test]
    fn phase_display_reads_naturally() {
        assert_eq!(PipelinePhase::Copying.to_string(), "Copying new files");
    }
}
