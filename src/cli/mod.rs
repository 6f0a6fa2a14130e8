//! # CLI Module
//!
//! Command-line interface for the media sorter.
//!
//! ## Usage
//! ```bash
//! # Sort a memory card into ./photos
//! media-sort /Volumes/SDCARD
//!
//! # Somewhere else, checking the whole library for duplicates
//! media-sort /Volumes/SDCARD --out ~/Pictures/library --full-scan
//!
//! # See what would happen
//! media-sort /Volumes/SDCARD --dry-run
//!
//! # Machine-readable summary
//! media-sort /Volumes/SDCARD --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_sorter::core::pipeline::{DestinationScan, Pipeline, RunReport, DEFAULT_DESTINATION};
use media_sorter::core::pool::DEFAULT_WORKERS;
use media_sorter::core::DuplicateMode;
use media_sorter::error::Result;
use media_sorter::events::{
    Event, EventChannel, FingerprintEvent, PipelineEvent, TransferEvent,
};
use media_sorter::logging::{self, DEFAULT_LOG_PATH};
use std::path::PathBuf;
use std::thread;
use tracing::warn;

/// Media Sorter - file photos and videos by capture date
#[derive(Parser, Debug)]
#[command(name = "media-sort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to import from
    source: PathBuf,

    /// Root of the date-structured library
    #[arg(short, long, default_value = DEFAULT_DESTINATION)]
    out: PathBuf,

    /// Transfer log, appended to on every run
    #[arg(long, default_value = DEFAULT_LOG_PATH)]
    log: PathBuf,

    /// Copy duplicates into a 'duplicates' folder
    #[arg(long)]
    copy_dupes: bool,

    /// Move existing duplicates to their correct location
    #[arg(long)]
    move_dupes: bool,

    /// Ignore really small photos and videos
    #[arg(long)]
    ignore_tiny: bool,

    /// Log what would happen without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Scan the entire destination for duplicates
    #[arg(long)]
    full_scan: bool,

    /// Include sidecar files, e.g. .xmp, .on1, .xml
    #[arg(long)]
    sidecar: bool,

    /// Log how long operations are taking
    #[arg(long)]
    analyze: bool,

    /// Concurrent fingerprinting workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(&cli.log, cli.dry_run)?;

    if cli.copy_dupes && cli.move_dupes {
        warn!("both --copy-dupes and --move-dupes given, moving duplicates only");
    }

    let scope = if cli.full_scan {
        DestinationScan::Full
    } else {
        DestinationScan::Scoped
    };

    let pipeline = Pipeline::builder()
        .source(&cli.source)
        .destination(&cli.out)
        .duplicates(DuplicateMode::from_flags(cli.copy_dupes, cli.move_dupes))
        .skip_tiny_files(cli.ignore_tiny)
        .dry_run(cli.dry_run)
        .scan_scope(scope)
        .include_sidecars(cli.sidecar)
        .analyze(cli.analyze)
        .workers(cli.workers)
        .build();

    let term = Term::stderr();
    let pretty = matches!(cli.output, OutputFormat::Pretty);

    if pretty {
        let mode = if cli.dry_run { " (dry run)" } else { "" };
        term.write_line(&format!(
            "{} {}{}",
            style("Media Sorter").bold().cyan(),
            style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
            style(mode).yellow()
        ))
        .ok();
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();

    let progress = if pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            // Drain so nothing piles up
            for _ in receiver.iter() {}
            return;
        };

        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Fingerprint(FingerprintEvent::Started { total })
                | Event::Transfer(TransferEvent::Started { total }) => {
                    pb.set_length(total as u64);
                    pb.set_position(0);
                }
                Event::Fingerprint(FingerprintEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Transfer(TransferEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = result?;

    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&term, &report),
        OutputFormat::Json => print_json_results(&report),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, report: &RunReport) {
    let heading = if report.dry_run {
        "Dry Run Complete"
    } else {
        "Transfer Complete"
    };
    term.write_line(&format!("{} {}", style("✓").green().bold(), heading))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} media files scanned in {:.1}s",
        style(report.scanned).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();

    let lines = [
        (report.copied, "copied", false),
        (report.copied_to_duplicates, "copied to duplicates", false),
        (report.replaced, "replaced smaller copies", false),
        (report.skipped_duplicates, "already in the library", true),
        (report.tiny_skipped, "too small, ignored", true),
        (report.relocated, "moved to their date folder", false),
        (report.already_in_place, "already in place", true),
    ];
    for (count, label, dim) in lines {
        if count == 0 {
            continue;
        }
        let count = if dim {
            style(count).dim()
        } else {
            style(count).cyan()
        };
        term.write_line(&format!("  {} {}", count, label)).ok();
    }

    if report.copied + report.copied_to_duplicates + report.replaced + report.relocated == 0 {
        term.write_line(&format!("  {}", style("No new files to copy or move.").green()))
            .ok();
    }

    if report.failures > 0 {
        term.write_line(&format!(
            "  {} failures, see the transfer log",
            style(report.failures).red().bold()
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!("{}", style(format!("Run {}", report.run_id)).dim()))
        .ok();
}

fn print_json_results(report: &RunReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize report: {}", e),
    }
}
