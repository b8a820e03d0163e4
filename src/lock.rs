// logbackuptool/src/lock.rs
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::{AppError, Result};

/// Exclusive marker file guarding against concurrent runs.
///
/// The marker holds the owning process id and is removed on [`LockGuard::release`]
/// or when the guard is dropped, whichever comes first.
#[derive(Debug)]
pub struct LockGuard {
    path: Option<PathBuf>,
}

impl LockGuard {
    /// Creates the marker at `path`. An empty path disables locking.
    pub fn acquire(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() {
            debug!("No lock file configured, skipping lock");
            return Ok(LockGuard { path: None });
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::Lock(format!(
                    "another instance is already running (lock file exists: {})",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(AppError::Lock(format!(
                    "failed to create lock file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            drop(file);
            let _ = fs::remove_file(path);
            return Err(AppError::Lock(format!(
                "failed to write to lock file {}: {}",
                path.display(),
                e
            )));
        }

        Ok(LockGuard {
            path: Some(path.to_path_buf()),
        })
    }

    pub fn is_held(&self) -> bool {
        self.path.is_some()
    }

    /// Removes the marker. Calling this more than once is harmless.
    pub fn release(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        match fs::remove_file(&path) {
            Ok(()) => debug!("Lock released: {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove lock file {}: {}", path.display(), e),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.release();
    }
}
