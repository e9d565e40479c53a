//! hpkg CLI entry point
//!
//! Parses the command line, sets up logging on stderr and runs the selected
//! packaging goal. Failures are printed as an error / details / suggestion
//! block and the process exits with status 1.

use anyhow::Result;
use clap::Parser;
use hpkg_cli::cli;
use hpkg_cli::core::error::user_friendly_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG, when set, wins over --verbose/--quiet
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
