#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters cannot overflow

//! # Driftscan - Filesystem Drift and Bit-Rot Detector
//!
//! Driftscan maintains a persistent manifest of known files (path, size,
//! modification time, and a SHA-256 content digest) and reconciles it
//! against the live state of one or more filesystem subtrees.
//!
//! Every scan classifies each regular file into one of four outcomes:
//!
//! - **Added**: the path has no manifest record yet
//! - **Updated**: size or modification time differs from the record
//! - **Damaged**: metadata matches the record but the content digest does
//!   not: silent corruption, or a modification that evaded the clock
//! - **Unchanged**: metadata and digest both match
//!
//! Content is re-digested on every scan regardless of whether metadata looks
//! unchanged; that full re-hash is what makes Damaged detectable at all.
//!
//! ## Architecture
//!
//! - [`engine`]: per-file classification, update policy, and the scan driver
//! - [`store`]: the persistent manifest (keyed record store)
//! - [`scanner`]: lazy depth-first filesystem traversal
//! - [`report`]: classification rendering and run counters
//! - [`config`]: configuration parsing with per-field defaults
//! - [`utils`]: content digesting and path helpers
//!
//! ## Example Usage
//!
//! ```no_run
//! use driftscan::{ScanContext, engine, report::Reporter, store::ManifestStore};
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = ScanContext::new(&["~/documents".to_string()], true, false, None)?;
//! let mut store = ManifestStore::open(&ctx.manifest_path, ctx.config.core.compression_level)?;
//! let mut reporter = Reporter::new(ctx.verbose);
//! engine::scan_roots(&ctx, &mut store, &mut reporter);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Configuration parsing and management.
pub mod config;

/// Reconciliation engine: classification, update policy, scan driver.
pub mod engine;

/// Classification event rendering and run counters.
pub mod report;

/// Lazy depth-first filesystem traversal.
pub mod scanner;

/// Persistent manifest store.
pub mod store;

/// Content digesting and path helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the driftscan binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path relative to the home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/driftscan/config";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "DRIFTSCAN_CONFIG_PATH";

/// State for a single reconciliation run.
///
/// Carries the roots to traverse, the manifest location, the loaded
/// configuration, and the run flags. All run state is threaded through this
/// context; there are no process-wide mutable globals.
#[derive(Debug, Clone)]
pub struct ScanContext {
    /// Root paths to traverse, in argument order.
    pub roots: Vec<PathBuf>,

    /// Location of the backing manifest store.
    pub manifest_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Whether accepted observations are written back to the manifest.
    /// When false the run is read-only: digests are still computed and
    /// classifications emitted, but the store is never mutated.
    pub update: bool,

    /// Whether Unchanged outcomes are reported.
    pub verbose: bool,
}

impl ScanContext {
    /// Creates a context by loading the configuration from its default
    /// location (or `DRIFTSCAN_CONFIG_PATH`).
    ///
    /// `db_override` takes precedence over the configured manifest path.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or the
    /// configuration cannot be read or created.
    pub fn new(
        roots: &[String],
        update: bool,
        verbose: bool,
        db_override: Option<PathBuf>,
    ) -> Result<Self> {
        let config_path = if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };

        let config = config::Config::load(&config_path)?;
        Self::with_config(roots, config, update, verbose, db_override)
    }

    /// Creates a context from an already-loaded configuration.
    ///
    /// Used by tests to avoid touching the real config location.
    ///
    /// # Errors
    /// Returns an error if a root path cannot be expanded.
    pub fn with_config(
        roots: &[String],
        config: config::Config,
        update: bool,
        verbose: bool,
        db_override: Option<PathBuf>,
    ) -> Result<Self> {
        let roots = roots
            .iter()
            .map(|r| utils::expand_tilde(r))
            .collect::<Result<Vec<_>>>()?;

        let manifest_path = db_override.unwrap_or_else(|| config.core.manifest_path.clone());

        Ok(Self {
            roots,
            manifest_path,
            config,
            update,
            verbose,
        })
    }
}
