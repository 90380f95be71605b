//! Reconciliation engine.
//!
//! The per-file classification algorithm and the sequential scan driver.
//! For every non-directory entry the engine computes a fresh content digest,
//! looks the path up in the manifest store, decides the outcome, applies the
//! update policy, and emits one classification event.
//!
//! The digest is computed unconditionally: even when metadata looks
//! unchanged, and even in read-only mode. Metadata equality is a heuristic,
//! not a guarantee; the unconditional re-hash is what detects silent
//! corruption. Skipping it when metadata matches would silently disable
//! Damaged detection.

use crate::ScanContext;
use crate::report::Reporter;
use crate::scanner::{ObservedEntry, Walk};
use crate::store::{FileRecord, ManifestStore, StoreError};
use crate::utils::hash;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Classification outcome for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No manifest record exists for the path.
    Added,
    /// Size or modification time differs from the record. Takes precedence
    /// over a content difference: Damaged is never used when metadata
    /// changed.
    Updated,
    /// Metadata matches the record but the content digest does not.
    Damaged,
    /// Metadata and digest both match the record.
    Unchanged,
}

/// A point-in-time observation of one file: size, mtime, digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Size in bytes.
    pub size: u64,
    /// Modification time (UTC).
    pub modified: DateTime<Utc>,
    /// Hex-encoded content digest.
    pub digest: String,
}

impl From<&FileRecord> for Snapshot {
    fn from(record: &FileRecord) -> Self {
        Self {
            size: record.size,
            modified: record.modified,
            digest: record.digest.clone(),
        }
    }
}

/// One classification, emitted per non-directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationEvent {
    /// Path of the classified file.
    pub path: PathBuf,
    /// The outcome.
    pub kind: Outcome,
    /// The stale manifest record, when one existed.
    pub old: Option<Snapshot>,
    /// The fresh observation.
    pub new: Snapshot,
}

/// A classification failure scoped to a single entry. The run continues
/// with the next entry.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// The file could not be opened or fully read while digesting. No
    /// partial digest is reported or stored.
    #[error("failed to digest {}: {source}", path.display())]
    Digest {
        /// Path of the affected file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A store consistency violation (duplicate insert, vanished record) or
    /// a failed write-through. Never swallowed; the entry's classification
    /// is abandoned with no half-written record.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The pure classification decision.
///
/// Metadata equality is checked before digest equality, so a metadata
/// change always classifies as [`Outcome::Updated`] even when the content
/// also differs; [`Outcome::Damaged`] is reserved for the
/// metadata-matches-but-content-differs case. No I/O, no rendering.
#[must_use]
pub fn decide(record: Option<&FileRecord>, observed: &ObservedEntry, digest: &str) -> Outcome {
    let Some(record) = record else {
        return Outcome::Added;
    };

    if observed.size != record.size || observed.modified != record.modified {
        Outcome::Updated
    } else if digest != record.digest {
        Outcome::Damaged
    } else {
        Outcome::Unchanged
    }
}

/// Classifies entries against one manifest store under one update policy.
pub struct Reconciler<'a> {
    /// The long-lived store handle for this run.
    store: &'a mut ManifestStore,
    /// Whether accepted observations are written back.
    update: bool,
    /// Digest mmap threshold, from the performance config.
    mmap_threshold: u64,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler over `store` with the given update policy.
    #[must_use]
    pub fn new(store: &'a mut ManifestStore, update: bool, mmap_threshold: u64) -> Self {
        Self {
            store,
            update,
            mmap_threshold,
        }
    }

    /// Classifies one observed file and applies the update policy.
    ///
    /// The content digest is always computed first; only the store writes
    /// are conditional on update mode. Added inserts a new unique record;
    /// Updated overwrites the existing one; Damaged and Unchanged never
    /// mutate the store (for Damaged there is no trustworthy value to
    /// promote).
    ///
    /// # Errors
    /// [`EntryError::Digest`] if the file cannot be read;
    /// [`EntryError::Store`] on a store consistency violation or a failed
    /// write.
    pub fn classify(&mut self, observed: &ObservedEntry) -> Result<ClassificationEvent, EntryError> {
        let digest =
            hash::hash_file(&observed.path, self.mmap_threshold).map_err(|source| {
                EntryError::Digest {
                    path: observed.path.clone(),
                    source,
                }
            })?;

        let record = self.store.get(&observed.path).cloned();
        let kind = decide(record.as_ref(), observed, &digest);
        let new = Snapshot {
            size: observed.size,
            modified: observed.modified,
            digest,
        };

        match kind {
            Outcome::Added => {
                if self.update {
                    self.store.insert_unique(FileRecord {
                        path: observed.path.clone(),
                        size: new.size,
                        modified: new.modified,
                        digest: new.digest.clone(),
                    })?;
                }
            }
            Outcome::Updated => {
                if self.update {
                    self.store.update_existing(
                        &observed.path,
                        new.size,
                        new.modified,
                        &new.digest,
                    )?;
                }
            }
            Outcome::Damaged | Outcome::Unchanged => {}
        }

        Ok(ClassificationEvent {
            path: observed.path.clone(),
            kind,
            old: record.as_ref().map(Snapshot::from),
            new,
        })
    }
}

/// Scans every root in argument order, sequentially.
///
/// One entry fully completes (stat, digest, lookup, mutation, report)
/// before the next begins. Per-entry failures are logged to the diagnostic
/// stream and skipped; the run always attempts to reach the end of
/// traversal. Returns the number of entries that failed.
pub fn scan_roots(ctx: &ScanContext, store: &mut ManifestStore, reporter: &mut Reporter) -> u64 {
    let mut failed = 0;
    for root in &ctx.roots {
        debug!(root = %root.display(), "scanning root");
        failed += scan_root(ctx, store, reporter, root);
    }
    failed
}

/// Scans a single root. Directories are skipped before classification.
fn scan_root(
    ctx: &ScanContext,
    store: &mut ManifestStore,
    reporter: &mut Reporter,
    root: &Path,
) -> u64 {
    let mut reconciler = Reconciler::new(store, ctx.update, ctx.config.performance.mmap_threshold);
    let mut failed = 0;

    for item in Walk::new(root, &ctx.config.tracking) {
        let observed = match item {
            Ok(observed) => observed,
            Err(e) => {
                warn!("{e}");
                failed += 1;
                continue;
            }
        };

        if observed.is_dir {
            continue;
        }

        match reconciler.classify(&observed) {
            Ok(event) => reporter.report(&event),
            Err(e @ EntryError::Store(_)) => {
                error!("{e}");
                failed += 1;
            }
            Err(e) => {
                warn!("{e}");
                failed += 1;
            }
        }
    }

    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn observed(size: u64, secs: i64) -> ObservedEntry {
        ObservedEntry {
            path: PathBuf::from("a.txt"),
            size,
            modified: Utc.timestamp_opt(secs, 0).unwrap(),
            is_dir: false,
        }
    }

    fn record(size: u64, secs: i64, digest: &str) -> FileRecord {
        FileRecord {
            path: PathBuf::from("a.txt"),
            size,
            modified: Utc.timestamp_opt(secs, 0).unwrap(),
            digest: digest.to_string(),
        }
    }

    #[test]
    fn test_decide_no_record_is_added() {
        assert_eq!(decide(None, &observed(5, 1_000), "d1"), Outcome::Added);
    }

    #[test]
    fn test_decide_size_change_is_updated() {
        let rec = record(5, 1_000, "d1");
        assert_eq!(
            decide(Some(&rec), &observed(6, 1_000), "d1"),
            Outcome::Updated
        );
    }

    #[test]
    fn test_decide_mtime_change_is_updated() {
        let rec = record(5, 1_000, "d1");
        assert_eq!(
            decide(Some(&rec), &observed(5, 2_000), "d1"),
            Outcome::Updated
        );
    }

    #[test]
    fn test_decide_metadata_change_beats_content_change() {
        // Content also differs, but metadata changed: never Damaged.
        let rec = record(5, 1_000, "d1");
        assert_eq!(
            decide(Some(&rec), &observed(5, 2_000), "d2"),
            Outcome::Updated
        );
    }

    #[test]
    fn test_decide_content_change_alone_is_damaged() {
        let rec = record(5, 1_000, "d1");
        assert_eq!(
            decide(Some(&rec), &observed(5, 1_000), "d2"),
            Outcome::Damaged
        );
    }

    #[test]
    fn test_decide_full_match_is_unchanged() {
        let rec = record(5, 1_000, "d1");
        assert_eq!(
            decide(Some(&rec), &observed(5, 1_000), "d1"),
            Outcome::Unchanged
        );
    }

    proptest! {
        /// Damaged is only ever produced when metadata matches exactly and
        /// the digest differs; any metadata difference forces Updated.
        #[test]
        fn prop_damaged_requires_equal_metadata(
            rec_size in 0u64..1_000_000,
            obs_size in 0u64..1_000_000,
            rec_secs in 0i64..2_000_000_000,
            obs_secs in 0i64..2_000_000_000,
            same_digest in proptest::bool::ANY,
        ) {
            let rec = record(rec_size, rec_secs, "d1");
            let obs = observed(obs_size, obs_secs);
            let digest = if same_digest { "d1" } else { "d2" };

            let outcome = decide(Some(&rec), &obs, digest);
            let metadata_equal = rec_size == obs_size && rec_secs == obs_secs;

            if !metadata_equal {
                prop_assert_eq!(outcome, Outcome::Updated);
            } else if same_digest {
                prop_assert_eq!(outcome, Outcome::Unchanged);
            } else {
                prop_assert_eq!(outcome, Outcome::Damaged);
            }
        }
    }
}
