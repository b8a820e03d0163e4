pub(crate) mod logic;
pub(crate) mod prefix;
pub(crate) mod s3_upload;
pub(crate) mod stats;
#[cfg(test)]
pub(crate) mod test_support;

use tracing::{error, info};

use crate::config::RunConfig;
use crate::context::RunContext;
use crate::errors::Result;
use crate::lock::LockGuard;
use crate::selection::find_target_files;
use crate::selection::period::CutoffTime;
use logic::{BackupPipeline, LocalFs, TokioFs, log_summary};
use s3_upload::{ObjectStore, S3ObjectStore};
use stats::RunStats;

/// Public entry point for one backup run: lock, connect, select, upload.
///
/// The lock is held for the whole run and released on every exit path.
pub async fn run_backup_flow(config: &RunConfig, context: &RunContext) -> Result<RunStats> {
    info!("=== Log backup process started (v{}) ===", context.version);
    info!("Glob pattern: {}", config.pattern);
    info!("Period: {}", config.period);

    let mut lock = LockGuard::acquire(&config.lock_path)?;
    if lock.is_held() {
        info!("Lock acquired: {}", config.lock_path.display());
    }

    let store = S3ObjectStore::connect(&config.transport).await?;
    store.check_bucket(&config.bucket).await?;

    let result = backup_with_store(config, context, &store, &TokioFs).await;
    lock.release();
    result
}

/// Selection and upload against an already connected store.
pub async fn backup_with_store(
    config: &RunConfig,
    context: &RunContext,
    store: &dyn ObjectStore,
    fs: &dyn LocalFs,
) -> Result<RunStats> {
    let cutoff = CutoffTime::compute(&context.now, config.retention);
    let selection = find_target_files(&config.pattern, &cutoff)?;

    if selection.targets.is_empty() {
        info!(
            "No files found for pattern '{}' before {}",
            config.pattern,
            cutoff.date()
        );
    } else {
        info!("Found {} files to backup", selection.targets.len());
    }

    let mut pipeline = BackupPipeline::new(config, context, store, fs);
    let result = pipeline.run(&selection).await;
    log_summary(&config.pattern, &cutoff, &pipeline.stats());

    match &result {
        Ok(_) => info!("=== Log backup process completed successfully ==="),
        Err(e) => error!("=== Log backup process failed: {} ===", e),
    }
    result
}
