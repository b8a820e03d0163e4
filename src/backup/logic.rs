use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info, warn};

use super::prefix::resolve_destination_key;
use super::s3_upload::{ObjectStore, UploadRequest};
use super::stats::RunStats;
use crate::config::RunConfig;
use crate::context::RunContext;
use crate::errors::{AppError, Result};
use crate::selection::{Selection, TargetFile};

/// Filesystem operations the pipeline performs on local files.
#[async_trait]
pub trait LocalFs: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;

    async fn remove_file(&self, path: &Path) -> std::io::Result<()>;
}

pub struct TokioFs;

#[async_trait]
impl LocalFs for TokioFs {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    async fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

/// Uploads selected files one at a time and optionally removes the local copy.
///
/// Per-file failures are counted and never stop the run; the aggregate
/// decision is made once every file has been attempted.
pub struct BackupPipeline<'a> {
    config: &'a RunConfig,
    context: &'a RunContext,
    store: &'a dyn ObjectStore,
    fs: &'a dyn LocalFs,
    stats: RunStats,
}

impl<'a> BackupPipeline<'a> {
    pub fn new(
        config: &'a RunConfig,
        context: &'a RunContext,
        store: &'a dyn ObjectStore,
        fs: &'a dyn LocalFs,
    ) -> Self {
        BackupPipeline {
            config,
            context,
            store,
            fs,
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Processes every selected file, then fails with
    /// [`AppError::Aggregate`] if any of them failed.
    pub async fn run(&mut self, selection: &Selection) -> Result<RunStats> {
        self.stats.total = selection.targets.len();
        self.stats.skipped += selection.skipped;

        for file in &selection.targets {
            self.process_file(file).await;
        }

        if self.stats.has_errors() {
            return Err(AppError::Aggregate {
                errors: self.stats.errors,
            });
        }
        Ok(self.stats)
    }

    async fn process_file(&mut self, file: &TargetFile) {
        if !self.fs.exists(&file.path).await {
            info!("File not found (may have been processed): {}", file.path.display());
            self.stats.skipped += 1;
            return;
        }

        if let Err(e) = self.upload(file).await {
            error!("Upload failed: {} ({})", file.path.display(), e);
            self.stats.errors += 1;
            return;
        }
        self.stats.uploaded += 1;

        if !self.config.delete_after_upload {
            return;
        }
        match self.delete_local_file(&file.path).await {
            Ok(()) => self.stats.deleted += 1,
            Err(e) => {
                error!("Delete failed: {} ({})", file.path.display(), e);
                self.stats.errors += 1;
            }
        }
    }

    async fn upload(&self, file: &TargetFile) -> Result<()> {
        let key = resolve_destination_key(&self.config.prefix, &file.file_name())?;
        info!(
            "Uploading: {} (date: {}) -> s3://{}/{}",
            file.path.display(),
            file.date,
            self.config.bucket,
            key
        );

        if self.config.dry_run {
            info!(
                "DRY RUN: Would upload {} to s3://{}/{}",
                file.path.display(),
                self.config.bucket,
                key
            );
            return Ok(());
        }

        let request = UploadRequest {
            bucket: self.config.bucket.clone(),
            key,
            path: file.path.clone(),
            storage_class: self.config.storage_class.clone(),
            metadata: self.object_metadata(&file.path),
        };
        self.store.put_object(&request).await?;

        info!("Upload successful: s3://{}/{}", request.bucket, request.key);
        Ok(())
    }

    fn object_metadata(&self, path: &Path) -> HashMap<String, String> {
        HashMap::from([
            ("source-host".to_string(), self.context.hostname.clone()),
            (
                "backup-date".to_string(),
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("original-path".to_string(), path.display().to_string()),
        ])
    }

    async fn delete_local_file(&self, path: &Path) -> Result<()> {
        if self.config.dry_run {
            info!("DRY RUN: Would delete {}", path.display());
            return Ok(());
        }

        self.fs
            .remove_file(path)
            .await
            .map_err(|e| AppError::Delete {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!("Local file deleted: {}", path.display());
        Ok(())
    }
}

/// Logs the end-of-run summary. Emitted on success and on aggregate failure.
pub fn log_summary(pattern: &str, cutoff: &impl std::fmt::Display, stats: &RunStats) {
    info!("=== Backup Summary ===");
    info!("Glob pattern: {}", pattern);
    info!("Cutoff time: {}", cutoff);
    info!("Backup summary: {}", stats);
    if stats.has_errors() {
        warn!("Backup completed with {} errors", stats.errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::test_support::{FailingFs, RecordingStore, test_config, test_context};
    use chrono::NaiveDate;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn target(dir: &Path, name: &str) -> anyhow::Result<TargetFile> {
        let path = dir.join(name);
        fs::write(&path, b"payload")?;
        Ok(TargetFile {
            path,
            date: crate::selection::date_pattern::extract_date_from_filename(name)?,
        })
    }

    fn selection(targets: Vec<TargetFile>) -> Selection {
        Selection {
            targets,
            skipped: 0,
        }
    }

    #[tokio::test]
    async fn test_second_upload_failure_is_isolated() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let files = vec![
            target(dir.path(), "app20240101.log")?,
            target(dir.path(), "app20240102.log")?,
            target(dir.path(), "app20240103.log")?,
        ];
        let config = test_config("*YYYYMMDD.log", "logs");
        let context = test_context();
        let store = RecordingStore::failing_on(&["logs/app20240102.log"]);

        let mut pipeline = BackupPipeline::new(&config, &context, &store, &TokioFs);
        let result = pipeline.run(&selection(files)).await;

        assert!(matches!(result, Err(AppError::Aggregate { errors: 1 })));
        let stats = pipeline.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.uploaded, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(
            store.attempted_keys(),
            vec!["logs/app20240101.log", "logs/app20240102.log", "logs/app20240103.log"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_request_carries_metadata_and_partitioned_key() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let file = target(dir.path(), "app20241215.log.gz")?;
        let config = test_config("app*YYYYMMDD.log.gz", "logs/YYYY/MM/DD");
        let context = test_context();
        let store = RecordingStore::default();

        let mut pipeline = BackupPipeline::new(&config, &context, &store, &TokioFs);
        pipeline.run(&selection(vec![file.clone()])).await?;

        let uploads = store.uploads();
        assert_eq!(uploads.len(), 1);
        let request = &uploads[0];
        assert_eq!(request.bucket, "test-bucket");
        assert_eq!(request.key, "logs/2024/12/15/app20241215.log.gz");
        assert_eq!(request.storage_class, "STANDARD_IA");
        assert_eq!(request.metadata["source-host"], "test-host");
        assert_eq!(request.metadata["original-path"], file.path.display().to_string());
        assert!(request.metadata["backup-date"].ends_with('Z'));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_after_upload_removes_local_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let file = target(dir.path(), "web-2024-01-01.log")?;
        let mut config = test_config("web-YYYY-MM-DD.log", "logs");
        config.delete_after_upload = true;
        let context = test_context();
        let store = RecordingStore::default();

        let mut pipeline = BackupPipeline::new(&config, &context, &store, &TokioFs);
        let stats = pipeline.run(&selection(vec![file.clone()])).await?;

        assert_eq!((stats.uploaded, stats.deleted, stats.errors), (1, 1, 0));
        assert!(!file.path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_upload_never_deletes() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let file = target(dir.path(), "web-2024-01-01.log")?;
        let mut config = test_config("web-YYYY-MM-DD.log", "logs");
        config.delete_after_upload = true;
        let context = test_context();
        let store = RecordingStore::failing_on(&["logs/web-2024-01-01.log"]);

        let mut pipeline = BackupPipeline::new(&config, &context, &store, &TokioFs);
        let result = pipeline.run(&selection(vec![file.clone()])).await;

        assert!(result.is_err());
        let stats = pipeline.stats();
        assert_eq!((stats.uploaded, stats.deleted, stats.errors), (0, 0, 1));
        assert!(file.path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_failure_counts_as_error_but_keeps_upload() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let file = target(dir.path(), "db_2024_01_01.gz")?;
        let mut config = test_config("db_YYYY_MM_DD.gz", "logs");
        config.delete_after_upload = true;
        let context = test_context();
        let store = RecordingStore::default();

        let mut pipeline = BackupPipeline::new(&config, &context, &store, &FailingFs);
        let result = pipeline.run(&selection(vec![file])).await;

        assert!(matches!(result, Err(AppError::Aggregate { errors: 1 })));
        let stats = pipeline.stats();
        assert_eq!((stats.uploaded, stats.deleted, stats.errors), (1, 0, 1));
        assert!(stats.uploaded >= stats.deleted);
        Ok(())
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let file = target(dir.path(), "app20240101.log")?;
        let mut config = test_config("app*YYYYMMDD.log", "logs");
        config.dry_run = true;
        config.delete_after_upload = true;
        let context = test_context();
        let store = RecordingStore::default();

        let mut pipeline = BackupPipeline::new(&config, &context, &store, &TokioFs);
        let stats = pipeline.run(&selection(vec![file.clone()])).await?;

        assert_eq!((stats.uploaded, stats.deleted, stats.errors), (1, 1, 0));
        assert!(store.uploads().is_empty());
        assert!(file.path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_vanished_file_is_skipped() -> anyhow::Result<()> {
        let config = test_config("app*YYYYMMDD.log", "logs");
        let context = test_context();
        let store = RecordingStore::default();
        let gone = TargetFile {
            path: PathBuf::from("/nonexistent/app20240101.log"),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };

        let mut pipeline = BackupPipeline::new(&config, &context, &store, &TokioFs);
        let stats = pipeline
            .run(&Selection {
                targets: vec![gone],
                skipped: 2,
            })
            .await?;

        assert_eq!((stats.total, stats.skipped, stats.uploaded), (1, 3, 0));
        assert!(store.attempted_keys().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_undated_name_with_partitioned_prefix_is_an_error() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("current.log");
        fs::write(&path, b"payload")?;
        let file = TargetFile {
            path,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let config = test_config("*.log", "logs/YYYY");
        let context = test_context();
        let store = RecordingStore::default();

        let mut pipeline = BackupPipeline::new(&config, &context, &store, &TokioFs);
        let result = pipeline.run(&selection(vec![file])).await;

        assert!(matches!(result, Err(AppError::Aggregate { errors: 1 })));
        assert!(store.attempted_keys().is_empty());
        Ok(())
    }
}
