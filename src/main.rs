//! Entry point for dossier, a terminal research assistant that turns web
//! research into a structured account plan.
//!
//! This binary loads environment variables, parses CLI arguments via [`cli`],
//! sets up file logging and dispatches to the appropriate subcommand handler.

mod agent;
mod app;
mod chat;
mod cli;
mod config;
mod constants;
mod format;
mod message;
mod plan;
mod provider;
mod tools;

use std::fs;

use anyhow::{Context, Result};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Runs the dossier CLI.
///
/// Loads `.env` files (silently ignored if absent), parses command-line
/// arguments into a [`cli::Cli`] struct, and dispatches the chosen
/// subcommand via [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;
    info!(version = env!("CARGO_PKG_VERSION"), "dossier starting");
    cli::run(cli).await
}

/// Sends `tracing` output to `dossier.log` in the data directory so it never
/// interleaves with the terminal conversation. `RUST_LOG` directives are honoured.
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = Config::data_dir()?;
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(constants::LOG_FILENAME))
        .context("Failed to open log file")?;

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!(verbose, "Logging initialized");
    Ok(())
}
