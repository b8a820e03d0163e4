//! Logging initialization.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Installs the global subscriber.
///
/// Without an output file, logs go to stdout. With one, logs are appended to
/// the file, and `verbose` additionally echoes them to stdout.
pub fn init_logging(output: Option<&Path>, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = fmt::Subscriber::builder().with_max_level(level);

    let Some(path) = output else {
        subscriber.with_writer(std::io::stdout).init();
        return Ok(());
    };

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    let log_file = Arc::new(log_file);

    if verbose {
        subscriber
            .with_ansi(false)
            .with_writer(std::io::stdout.and(log_file))
            .init();
    } else {
        subscriber.with_ansi(false).with_writer(log_file).init();
    }

    Ok(())
}
