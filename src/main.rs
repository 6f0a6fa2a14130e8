//! # media-sort CLI
//!
//! Command-line interface for the media sorter.
//!
//! ## Usage
//! ```bash
//! media-sort /Volumes/SDCARD --out ~/Pictures/library
//! media-sort /Volumes/SDCARD --move-dupes --full-scan --output json
//! ```

mod cli;

use media_sorter::Result;

fn main() -> Result<()> {
    cli::run()
}
