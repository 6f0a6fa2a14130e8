//! Destination placement.
//!
//! Derives date-structured paths, picks collision-safe names and performs the
//! copies, replacements and relocations the dedup plan asks for.

mod executor;
mod layout;
mod naming;

pub use executor::{copy_preserving_times, Placed, Placer, Relocated};
pub use layout::{canonical_dir, date_folder, duplicates_dir, DUPLICATES_DIR, UNKNOWN_DIR};
pub use naming::NameReservations;
