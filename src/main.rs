//! Log Backup Tool
//!
//! Archives aged, date-named log files to S3 and optionally removes the local copies.

// logbackuptool/src/main.rs
mod backup;
mod cli;
mod config;
mod context;
mod errors;
mod lock;
mod logging;
mod selection;

use anyhow::{Context, Result};
use backup::stats::RunStats;
use clap::Parser;
use cli::Cli;
use config::{RawJsonConfig, RunConfig};
use context::RunContext;
use std::process::ExitCode;

const COLOR_RED: &str = "\x1b[31m";
const COLOR_RESET: &str = "\x1b[0m";

/// Main entry point for the backup tool
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run_app(cli).await {
        Ok(stats) => {
            println!("✅ Backup completed successfully ({})", stats);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}Error: {:#}{}", COLOR_RED, e, COLOR_RESET);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(cli: Cli) -> Result<RunStats> {
    let file_config = match &cli.config {
        Some(path) => Some(
            RawJsonConfig::load_from_json(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        ),
        None => None,
    };
    let config = RunConfig::from_sources(&cli, file_config.as_ref())?;

    logging::init_logging(config.output_file.as_deref(), config.verbose)?;
    let context = RunContext::capture();

    // Dropping the run future on a signal drops the lock guard, which removes the marker.
    tokio::select! {
        result = backup::run_backup_flow(&config, &context) => {
            Ok(result.context("Backup process failed")?)
        }
        signal = shutdown_signal() => {
            tracing::warn!("Received {}, aborting backup run", signal);
            anyhow::bail!("Interrupted by {}", signal)
        }
    }
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => tokio::select! {
            _ = ctrl_c() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        },
        Err(_) => {
            ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await;
    "Ctrl-C"
}
