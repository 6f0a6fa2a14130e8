//! Transfer log setup.
//!
//! Every run appends to a single log file. All levels go to the file; errors
//! are echoed to stderr as well. Tab-separated cells in the file are padded
//! into columns as lines stream out.

use crate::error::{OrganizerError, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log location
pub const DEFAULT_LOG_PATH: &str = "./transfer.log";

const RULE: &str = "************************************************";

/// Open `log_path` for appending and install the global subscriber.
///
/// The file filter follows `RUST_LOG`, defaulting to `info`. Keep the
/// returned guard alive until the run ends, dropping it flushes the file.
pub fn init(log_path: &Path, dry_run: bool) -> Result<WorkerGuard> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|source| OrganizerError::LogFile {
            path: log_path.to_path_buf(),
            source,
        })?;

    let (writer, guard) = tracing_appender::non_blocking(file);

    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(TabAligned::new(writer))
                .with_ansi(false)
                .with_target(false)
                .with_filter(file_filter),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_filter(LevelFilter::ERROR),
        )
        .try_init()
        .map_err(|e| OrganizerError::Config(format!("logging already initialised: {e}")))?;

    banner(dry_run);
    Ok(guard)
}

const CELL_GAP: usize = 2;

/// Pads each tab-separated cell to the widest cell seen so far in its column.
///
/// Widths only grow, so earlier lines are never rewritten; a long path widens
/// the column for every line after it.
#[derive(Clone)]
struct TabAligned<W> {
    inner: W,
    widths: Arc<Mutex<Vec<usize>>>,
}

impl<W> TabAligned<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            widths: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<'a, W: Write + Clone + 'a> MakeWriter<'a> for TabAligned<W> {
    type Writer = AlignedEvent<W>;

    fn make_writer(&'a self) -> Self::Writer {
        AlignedEvent {
            buf: Vec::new(),
            inner: self.inner.clone(),
            widths: Arc::clone(&self.widths),
        }
    }
}

/// Buffers one formatted event and writes it aligned when dropped
struct AlignedEvent<W: Write> {
    buf: Vec<u8>,
    inner: W,
    widths: Arc<Mutex<Vec<usize>>>,
}

impl<W: Write> Write for AlignedEvent<W> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> Drop for AlignedEvent<W> {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        let mut widths = self.widths.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut out = String::with_capacity(text.len() + 32);
        for line in text.split_inclusive('\n') {
            let (body, newline) = match line.strip_suffix('\n') {
                Some(body) => (body, "\n"),
                None => (line, ""),
            };
            out.push_str(&align_cells(&mut widths, body));
            out.push_str(newline);
        }
        drop(widths);

        let _ = self.inner.write_all(out.as_bytes());
    }
}

fn align_cells(widths: &mut Vec<usize>, line: &str) -> String {
    let mut cells = line.split('\t').peekable();
    let mut out = String::with_capacity(line.len() + 16);
    let mut column = 0;

    while let Some(cell) = cells.next() {
        out.push_str(cell);
        if cells.peek().is_none() {
            break;
        }
        let width = cell.chars().count();
        if column == widths.len() {
            widths.push(width);
        }
        widths[column] = widths[column].max(width);
        out.extend(std::iter::repeat(' ').take(widths[column] - width + CELL_GAP));
        column += 1;
    }
    out
}

fn banner(dry_run: bool) {
    info!("{}", RULE);
    if dry_run {
        info!(" * * * *            DRY RUN             * * * * ");
    } else {
        info!(" > > > >            NEW RUN             < < < < ");
    }
    info!("{}", RULE);
}
