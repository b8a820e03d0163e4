//! Fakes shared by the backup tests.

use async_trait::async_trait;
use chrono::{Local, TimeZone};
use std::collections::HashSet;
use std::io::{Error, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

use super::logic::LocalFs;
use super::s3_upload::{ObjectStore, UploadRequest};
use crate::config::{RunConfig, TransportConfig};
use crate::context::RunContext;
use crate::errors::{AppError, Result};
use crate::selection::period::parse_period;

/// In-memory store that records every attempt and fails on chosen keys.
#[derive(Default)]
pub struct RecordingStore {
    fail_keys: HashSet<String>,
    attempts: Mutex<Vec<UploadRequest>>,
    uploads: Mutex<Vec<UploadRequest>>,
}

impl RecordingStore {
    pub fn failing_on(keys: &[&str]) -> Self {
        RecordingStore {
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn attempted_keys(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.key.clone())
            .collect()
    }

    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn check_bucket(&self, _bucket: &str) -> Result<()> {
        Ok(())
    }

    async fn put_object(&self, request: &UploadRequest) -> Result<()> {
        self.attempts.lock().unwrap().push(request.clone());
        if self.fail_keys.contains(&request.key) {
            return Err(AppError::Upload {
                path: request.path.display().to_string(),
                key: request.key.clone(),
                reason: "simulated network failure".to_string(),
            });
        }
        self.uploads.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// Filesystem whose deletes always fail.
pub struct FailingFs;

#[async_trait]
impl LocalFs for FailingFs {
    async fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn remove_file(&self, _path: &Path) -> std::io::Result<()> {
        Err(Error::new(ErrorKind::PermissionDenied, "read-only filesystem"))
    }
}

/// Collects formatted log lines emitted on the current thread.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Routes this thread's tracing events here until the guard is dropped.
    pub fn install(&self) -> DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn test_config(pattern: &str, prefix: &str) -> RunConfig {
    RunConfig {
        pattern: pattern.to_string(),
        period: "1 day".to_string(),
        retention: parse_period("1 day").unwrap(),
        bucket: "test-bucket".to_string(),
        prefix: prefix.to_string(),
        storage_class: "STANDARD_IA".to_string(),
        delete_after_upload: false,
        dry_run: false,
        verbose: false,
        lock_path: PathBuf::new(),
        output_file: None,
        transport: TransportConfig::default(),
    }
}

/// Context pinned to 2024-12-15 10:00 local time.
pub fn test_context() -> RunContext {
    let now = Local.with_ymd_and_hms(2024, 12, 15, 10, 0, 0).unwrap();
    RunContext::new("test-host", now)
}
