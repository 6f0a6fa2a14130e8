//! # Dedup Module
//!
//! Reconciles a source fingerprint index against the destination index.
//!
//! Works in two passes: [`classify`] takes an immutable snapshot of one
//! decision per source fingerprint, then [`apply`] consumes both indexes and
//! turns those decisions into a [`DedupPlan`] for the placement stage.
//!
//! ## Rules
//! - Not in the destination: **New**
//! - In the destination, default mode: **Replace** when the source copy is
//!   strictly larger (the destination copy is assumed incomplete), otherwise
//!   **Skip**
//! - [`DuplicateMode::CopyToDuplicates`]: nothing is filtered, duplicates are
//!   routed to the duplicates subtree
//! - [`DuplicateMode::Relocate`]: same size rule as the default, and the
//!   destination item is always registered for relocation

use crate::core::media::{Fingerprint, FingerprintIndex, MediaItem};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// What to do with source files whose content is already in the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMode {
    /// Drop duplicates, replacing truncated destination copies
    #[default]
    Skip,
    /// Copy every duplicate into `duplicates/<date>/`
    CopyToDuplicates,
    /// Skip/replace as by default, then move the destination copy to its
    /// canonical location
    Relocate,
}

impl DuplicateMode {
    /// Combine the two command line switches. Relocation takes precedence.
    pub fn from_flags(copy_duplicates: bool, move_duplicates: bool) -> Self {
        match (copy_duplicates, move_duplicates) {
            (_, true) => DuplicateMode::Relocate,
            (true, false) => DuplicateMode::CopyToDuplicates,
            (false, false) => DuplicateMode::Skip,
        }
    }

    /// Destination items need their own capture dates only when relocating
    pub fn needs_destination_dates(&self) -> bool {
        *self == DuplicateMode::Relocate
    }
}

/// Which subtree a new item is copied into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Canonical,
    Duplicates,
}

/// Outcome for one source fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupDecision {
    /// Copy the source item
    New { route: Route },
    /// Drop the source item, `existing` already holds the content
    Skip { existing: PathBuf },
    /// Overwrite the smaller `existing` copy
    Replace { existing: PathBuf },
    /// Move the destination copy at `existing` to its canonical location,
    /// after replacing it when `replace` is set
    Relocate { existing: PathBuf, replace: bool },
}

/// Where a transfer writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Canonical date directory, collision-safe name
    Canonical,
    /// Duplicates subtree, collision-safe name
    Duplicates,
    /// Overwrite this exact path
    Replace(PathBuf),
}

/// A source item to be copied
#[derive(Debug, Clone)]
pub struct Transfer {
    pub item: MediaItem,
    pub target: Target,
}

/// A destination item to be moved to its canonical location
#[derive(Debug, Clone)]
pub struct Relocation {
    /// The destination copy
    pub item: MediaItem,
    /// The source item with the same fingerprint
    pub counterpart: MediaItem,
}

/// Everything the placement stage has to do
#[derive(Debug, Default)]
pub struct DedupPlan {
    pub transfers: Vec<Transfer>,
    pub relocations: Vec<Relocation>,
    /// Source items dropped as duplicates
    pub skipped: usize,
}

impl DedupPlan {
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty() && self.relocations.is_empty()
    }

    /// Number of transfers that overwrite an existing copy
    pub fn replacements(&self) -> usize {
        self.transfers
            .iter()
            .filter(|t| matches!(t.target, Target::Replace(_)))
            .count()
    }
}

/// Decide the fate of every source fingerprint without touching either index.
///
/// Decisions come back sorted by fingerprint.
pub fn classify(
    source: &FingerprintIndex,
    destination: &FingerprintIndex,
    mode: DuplicateMode,
) -> Vec<(Fingerprint, DedupDecision)> {
    let mut decisions: Vec<(Fingerprint, DedupDecision)> = source
        .iter()
        .map(|(fingerprint, item)| {
            let decision = match destination.get(fingerprint) {
                None => DedupDecision::New {
                    route: Route::Canonical,
                },
                Some(existing) => decide_duplicate(item, existing, mode),
            };
            (*fingerprint, decision)
        })
        .collect();

    decisions.sort_by(|a, b| a.0.cmp(&b.0));
    decisions
}

fn decide_duplicate(source: &MediaItem, existing: &MediaItem, mode: DuplicateMode) -> DedupDecision {
    let larger = source.size > existing.size;
    let existing = existing.path.clone();

    match mode {
        DuplicateMode::CopyToDuplicates => DedupDecision::New {
            route: Route::Duplicates,
        },
        DuplicateMode::Relocate => DedupDecision::Relocate {
            existing,
            replace: larger,
        },
        DuplicateMode::Skip if larger => DedupDecision::Replace { existing },
        DuplicateMode::Skip => DedupDecision::Skip { existing },
    }
}

/// Turn decisions into a plan, consuming both indexes
pub fn apply(
    decisions: Vec<(Fingerprint, DedupDecision)>,
    mut source: FingerprintIndex,
    mut destination: FingerprintIndex,
) -> DedupPlan {
    let mut plan = DedupPlan::default();

    for (fingerprint, decision) in decisions {
        let Some(item) = source.remove(&fingerprint) else {
            continue;
        };

        match decision {
            DedupDecision::New { route } => {
                let target = match route {
                    Route::Canonical => Target::Canonical,
                    Route::Duplicates => Target::Duplicates,
                };
                plan.transfers.push(Transfer { item, target });
            }
            DedupDecision::Skip { existing } => {
                info!("{}\tDuplicate of\t{}", item.path.display(), existing.display());
                plan.skipped += 1;
            }
            DedupDecision::Replace { existing } => {
                plan.transfers.push(replacement(item, existing));
            }
            DedupDecision::Relocate { existing, replace } => {
                if let Some(destination_item) = destination.remove(&fingerprint) {
                    plan.relocations.push(Relocation {
                        item: destination_item,
                        counterpart: item.clone(),
                    });
                }

                if replace {
                    plan.transfers.push(replacement(item, existing));
                } else {
                    info!("{}\tDuplicate of\t{}", item.path.display(), existing.display());
                    plan.skipped += 1;
                }
            }
        }
    }

    plan
}

fn replacement(mut item: MediaItem, existing: PathBuf) -> Transfer {
    info!(
        "{}\tis larger than duplicate, replacing\t{}",
        item.path.display(),
        existing.display()
    );
    item.replace = true;
    Transfer {
        item,
        target: Target::Replace(existing),
    }
}

/// Classify and apply in one go
pub fn plan(
    source: FingerprintIndex,
    destination: FingerprintIndex,
    mode: DuplicateMode,
) -> DedupPlan {
    let decisions = classify(&source, &destination, mode);
    apply(decisions, source, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::media::MediaKind;

    fn item(root: &str, name: &str, fingerprint: u8, size: u64) -> MediaItem {
        MediaItem {
            path: PathBuf::from(root).join(name),
            name: name.into(),
            fingerprint: Fingerprint::from_bytes([fingerprint; 16]),
            size,
            kind: MediaKind::Photo,
            taken: None,
            replace: false,
        }
    }

    fn index(items: Vec<MediaItem>) -> FingerprintIndex {
        items.into_iter().collect()
    }

    #[test]
    fn unseen_content_is_new() {
        let source = index(vec![item("/src", "a.jpg", 1, 100)]);
        let destination = index(vec![item("/dest", "b.jpg", 2, 100)]);

        let plan = plan(source, destination, DuplicateMode::Skip);

        assert_eq!(plan.transfers.len(), 1);
        assert_eq!(plan.transfers[0].target, Target::Canonical);
        assert_eq!(plan.skipped, 0);
    }

    #[test]
    fn duplicate_of_equal_size_is_skipped() {
        let source = index(vec![item("/src", "a.jpg", 1, 100)]);
        let destination = index(vec![item("/dest", "a.jpg", 1, 100)]);

        let decisions = classify(&source, &destination, DuplicateMode::Skip);
        assert_eq!(
            decisions[0].1,
            DedupDecision::Skip {
                existing: PathBuf::from("/dest/a.jpg")
            }
        );

        let plan = apply(decisions, source, destination);
        assert!(plan.is_empty());
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn smaller_source_is_skipped() {
        let source = index(vec![item("/src", "a.jpg", 1, 50)]);
        let destination = index(vec![item("/dest", "a.jpg", 1, 100)]);

        let plan = plan(source, destination, DuplicateMode::Skip);
        assert!(plan.is_empty());
    }

    #[test]
    fn larger_source_replaces_existing_path() {
        let source = index(vec![item("/src", "a.jpg", 1, 200)]);
        let destination = index(vec![item("/dest/2020/01/01", "a.jpg", 1, 100)]);

        let plan = plan(source, destination, DuplicateMode::Skip);

        assert_eq!(plan.transfers.len(), 1);
        assert_eq!(plan.replacements(), 1);
        let transfer = &plan.transfers[0];
        assert!(transfer.item.replace);
        assert_eq!(
            transfer.target,
            Target::Replace(PathBuf::from("/dest/2020/01/01/a.jpg"))
        );
    }

    #[test]
    fn copy_duplicates_routes_instead_of_filtering() {
        let source = index(vec![
            item("/src", "dupe.jpg", 1, 10),
            item("/src", "fresh.jpg", 2, 10),
        ]);
        let destination = index(vec![item("/dest", "dupe.jpg", 1, 500)]);

        let plan = plan(source, destination, DuplicateMode::CopyToDuplicates);

        assert_eq!(plan.transfers.len(), 2);
        assert_eq!(plan.skipped, 0);
        let dupe = plan.transfers.iter().find(|t| t.item.name == "dupe.jpg").unwrap();
        let fresh = plan.transfers.iter().find(|t| t.item.name == "fresh.jpg").unwrap();
        assert_eq!(dupe.target, Target::Duplicates);
        assert_eq!(fresh.target, Target::Canonical);
        assert!(plan.relocations.is_empty());
    }

    #[test]
    fn relocate_registers_destination_item_when_skipping() {
        let source = index(vec![item("/src", "a.jpg", 1, 100)]);
        let destination = index(vec![item("/dest/unknown", "a.jpg", 1, 100)]);

        let plan = plan(source, destination, DuplicateMode::Relocate);

        assert!(plan.transfers.is_empty());
        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.relocations.len(), 1);
        assert_eq!(plan.relocations[0].item.path, PathBuf::from("/dest/unknown/a.jpg"));
        assert_eq!(plan.relocations[0].counterpart.path, PathBuf::from("/src/a.jpg"));
        assert!(!plan.is_empty());
    }

    #[test]
    fn relocate_registers_destination_item_when_replacing() {
        let source = index(vec![item("/src", "a.jpg", 1, 300)]);
        let destination = index(vec![item("/dest/unknown", "a.jpg", 1, 100)]);

        let plan = plan(source, destination, DuplicateMode::Relocate);

        assert_eq!(plan.replacements(), 1);
        assert_eq!(plan.relocations.len(), 1);
    }

    #[test]
    fn classification_does_not_touch_indexes() {
        let source = index(vec![item("/src", "a.jpg", 1, 100)]);
        let destination = index(vec![item("/dest", "a.jpg", 1, 100)]);

        let _ = classify(&source, &destination, DuplicateMode::Relocate);

        assert_eq!(source.len(), 1);
        assert_eq!(destination.len(), 1);
    }

    #[test]
    fn move_flag_wins_over_copy_flag() {
        assert_eq!(DuplicateMode::from_flags(true, true), DuplicateMode::Relocate);
        assert_eq!(DuplicateMode::from_flags(true, false), DuplicateMode::CopyToDuplicates);
        assert_eq!(DuplicateMode::from_flags(false, false), DuplicateMode::Skip);
        assert!(DuplicateMode::Relocate.needs_destination_dates());
        assert!(!DuplicateMode::CopyToDuplicates.needs_destination_dates());
    }
}
