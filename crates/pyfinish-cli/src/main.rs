//! pyfinish CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pyfinish_cli::Cli;
use pyfinish_core::{Driver, PROGRAM_FAILURE_MARKER, TracingReporter};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config()?;

    // Initialize logging; RUST_LOG wins over the verbose option
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if config.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let platform = cli.platform();
    tracing::debug!(?config, %platform, "Resolved options");

    let outcome = Driver::new(&config, platform, TracingReporter).finish();
    if !outcome.is_success() {
        eprintln!("{PROGRAM_FAILURE_MARKER}{}", outcome.message);
        std::process::exit(outcome.status);
    }

    Ok(())
}
