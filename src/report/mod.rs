//! Classification event rendering and run counters.
//!
//! A pure projection from classification events to display lines, plus the
//! running counters for the end-of-run summary. Rendering never influences
//! classification or store mutation. Report lines go to stdout; the summary
//! goes to stderr so the report stream stays parseable.

use crate::engine::{ClassificationEvent, Outcome, Snapshot};
use chrono::SecondsFormat;
use colored::{ColoredString, Colorize};
use std::path::Path;
use std::time::{Duration, Instant};

/// Display severity for an outcome tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Routine growth (Added).
    Success,
    /// Legitimate drift (Updated).
    Notice,
    /// Integrity violation (Damaged).
    Alert,
    /// Routine no-op (Unchanged).
    Muted,
}

/// Pure mapping from outcome to display style.
#[must_use]
pub const fn style_for(kind: Outcome) -> LineStyle {
    match kind {
        Outcome::Added => LineStyle::Success,
        Outcome::Updated => LineStyle::Notice,
        Outcome::Damaged => LineStyle::Alert,
        Outcome::Unchanged => LineStyle::Muted,
    }
}

/// Applies a style to a rendered line.
fn paint(style: LineStyle, text: &str) -> ColoredString {
    match style {
        LineStyle::Success => text.green(),
        LineStyle::Notice => text.yellow(),
        LineStyle::Alert => text.red().bold(),
        LineStyle::Muted => text.dimmed(),
    }
}

/// Builds the uncolored report lines for an event.
///
/// Updated and Damaged render two lines (the stale record first, then the
/// fresh observation); Added and Unchanged render one.
#[must_use]
pub fn event_lines(event: &ClassificationEvent) -> Vec<String> {
    match event.kind {
        Outcome::Added => vec![line("added:", &event.path, &event.new)],
        Outcome::Unchanged => vec![line("unchanged:", &event.path, &event.new)],
        Outcome::Updated => snapshot_pair(event, "updated(old):", "updated(new):"),
        Outcome::Damaged => snapshot_pair(event, "damaged(old):", "damaged(new):"),
    }
}

/// Old-then-new line pair for outcomes that carry both snapshots.
fn snapshot_pair(event: &ClassificationEvent, old_tag: &str, new_tag: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if let Some(old) = &event.old {
        lines.push(line(old_tag, &event.path, old));
    }
    lines.push(line(new_tag, &event.path, &event.new));
    lines
}

/// One report line: tag, path, size, mtime, digest.
fn line(tag: &str, path: &Path, snapshot: &Snapshot) -> String {
    format!(
        "{tag:<14}{}  {}  {}  {}",
        path.display(),
        snapshot.size,
        snapshot.modified.to_rfc3339_opts(SecondsFormat::Secs, true),
        snapshot.digest,
    )
}

/// Renders classification events and keeps the run counters.
#[derive(Debug)]
pub struct Reporter {
    /// Whether Unchanged events are emitted.
    verbose: bool,
    /// Files processed, including suppressed Unchanged ones.
    processed: u64,
    /// Added tally.
    added: u64,
    /// Updated tally.
    updated: u64,
    /// Damaged tally.
    damaged: u64,
    /// Unchanged tally.
    unchanged: u64,
    /// Run start, for the summary's elapsed time.
    started: Instant,
}

impl Reporter {
    /// Creates a reporter. `verbose` controls Unchanged emission; Added,
    /// Updated, and Damaged are always emitted.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            processed: 0,
            added: 0,
            updated: 0,
            damaged: 0,
            unchanged: 0,
            started: Instant::now(),
        }
    }

    /// Counts the event and prints its report lines to stdout, colored by
    /// outcome severity.
    pub fn report(&mut self, event: &ClassificationEvent) {
        self.processed += 1;
        match event.kind {
            Outcome::Added => self.added += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Damaged => self.damaged += 1,
            Outcome::Unchanged => self.unchanged += 1,
        }

        if self.suppressed(event.kind) {
            return;
        }

        let style = style_for(event.kind);
        for text in event_lines(event) {
            println!("{}", paint(style, &text));
        }
    }

    /// Whether an outcome is suppressed under the current verbosity.
    #[must_use]
    pub const fn suppressed(&self, kind: Outcome) -> bool {
        matches!(kind, Outcome::Unchanged) && !self.verbose
    }

    /// Files processed so far, including suppressed ones.
    #[must_use]
    pub const fn processed(&self) -> u64 {
        self.processed
    }

    /// Damaged files seen so far.
    #[must_use]
    pub const fn damaged(&self) -> u64 {
        self.damaged
    }

    /// Prints the end-of-run summary to stderr.
    pub fn summary(&self) {
        let elapsed = Duration::from_millis(
            u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        let text = format!(
            "checked {} file(s) ({} added, {} updated, {} damaged, {} unchanged) in {}",
            self.processed,
            self.added,
            self.updated,
            self.damaged,
            self.unchanged,
            humantime::format_duration(elapsed),
        );
        eprintln!("{}", text.dimmed());
    }
}
