//! Lazy depth-first filesystem traversal.
//!
//! [`Walk`] yields one [`ObservedEntry`] per filesystem entry under a root,
//! in depth-first order. The sequence is finite and not restartable. An
//! error on one entry is yielded in place of it; enumeration of the
//! remaining entries continues, and the caller decides whether to keep
//! going (the scan driver does).

use crate::config::TrackingConfig;
use crate::utils::{should_ignore, system_time_to_utc};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One traversal step: the live state of a single filesystem entry.
///
/// Never persisted; consumed by the engine immediately and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedEntry {
    /// Path of the entry.
    pub path: PathBuf,
    /// Size in bytes, as reported by the filesystem.
    pub size: u64,
    /// Modification time, normalized to UTC at full precision.
    pub modified: DateTime<Utc>,
    /// Whether the entry is a directory (directories are never classified).
    pub is_dir: bool,
}

/// A traversal error scoped to a single entry.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The entry could not be enumerated or stat'ed during the walk.
    #[error("traversal failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// The entry's modification time could not be read.
    #[error("failed to read modification time for {}: {source}", path.display())]
    Mtime {
        /// Path of the affected entry.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Lazy depth-first walk of one root.
pub struct Walk {
    /// Underlying walkdir iterator.
    it: walkdir::IntoIter,
    /// Patterns pruning entries (and their subtrees, for directories).
    ignore_patterns: Vec<String>,
}

impl Walk {
    /// Starts a walk rooted at `root`. Symlink following and ignore
    /// patterns come from the tracking configuration.
    #[must_use]
    pub fn new(root: &Path, tracking: &TrackingConfig) -> Self {
        Self {
            it: WalkDir::new(root)
                .follow_links(tracking.follow_symlinks)
                .into_iter(),
            ignore_patterns: tracking.ignore_patterns.clone(),
        }
    }
}

impl Iterator for Walk {
    type Item = Result<ObservedEntry, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.it.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(ScanError::Walk(e))),
            };

            if should_ignore(entry.path(), &self.ignore_patterns) {
                if entry.file_type().is_dir() {
                    self.it.skip_current_dir();
                }
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => return Some(Err(ScanError::Walk(e))),
            };

            let modified = match metadata.modified() {
                Ok(time) => system_time_to_utc(time),
                Err(source) => {
                    return Some(Err(ScanError::Mtime {
                        path: entry.into_path(),
                        source,
                    }));
                }
            };

            return Some(Ok(ObservedEntry {
                is_dir: metadata.is_dir(),
                size: metadata.len(),
                modified,
                path: entry.into_path(),
            }));
        }
    }
}
