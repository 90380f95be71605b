//! Command-line interface definitions for driftscan.
//!
//! Note: Field-level documentation is provided via clap doc comments, so we
//! allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for driftscan.
#[derive(Parser)]
#[command(
    name = "drift",
    version = crate::VERSION,
    about = "Detect new, changed, and silently damaged files",
    long_about = "Reconciles a persistent manifest of file digests against the live \
filesystem, reporting files that are new, legitimately changed, or damaged \
(content differs while size and mtime do not)"
)]
pub struct Cli {
    /// Root paths to scan, traversed in argument order
    #[arg(value_name = "ROOT", required_unless_present = "completions")]
    pub roots: Vec<String>,

    /// Record new observations into the manifest (default: read-only report)
    #[arg(short, long)]
    pub update: bool,

    /// Also report unchanged files
    #[arg(short, long)]
    pub verbose: bool,

    /// Manifest store location (defaults to the configured path)
    #[arg(short = 'd', long = "db", value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Generate shell completion scripts and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roots_and_flags() {
        let cli = Cli::try_parse_from(["drift", "-u", "-v", "--db", "/tmp/m.db", "/a", "/b"])
            .expect("should parse");
        assert_eq!(cli.roots, vec!["/a".to_string(), "/b".to_string()]);
        assert!(cli.update);
        assert!(cli.verbose);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/m.db")));
    }

    #[test]
    fn test_roots_required() {
        assert!(Cli::try_parse_from(["drift"]).is_err());
    }

    #[test]
    fn test_completions_without_roots() {
        let cli = Cli::try_parse_from(["drift", "--completions", "bash"]).expect("should parse");
        assert!(cli.roots.is_empty());
        assert!(cli.completions.is_some());
    }
}
