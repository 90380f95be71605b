use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use driftscan::cli::Cli;
use driftscan::report::Reporter;
use driftscan::store::ManifestStore;
use driftscan::{ScanContext, engine};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_tracing(cli.verbose);

    let ctx = ScanContext::new(&cli.roots, cli.update, cli.verbose, cli.db)?;
    let mut store = ManifestStore::open(&ctx.manifest_path, ctx.config.core.compression_level)
        .with_context(|| {
            format!(
                "Failed to open manifest store: {}",
                ctx.manifest_path.display()
            )
        })?;

    let mut reporter = Reporter::new(ctx.verbose);
    let failed = engine::scan_roots(&ctx, &mut store, &mut reporter);
    reporter.summary();

    if failed > 0 {
        tracing::warn!("{failed} entries could not be processed");
    }

    // Lenient exit policy: per-entry failures and damaged files do not
    // change the exit status once traversal has run to completion.
    Ok(())
}

/// Diagnostics go to stderr so stdout stays a clean report stream.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}
