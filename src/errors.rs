use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Date extraction failed: {0}")]
    DateExtraction(String),

    #[error("Upload of {path} to {key} failed: {reason}")]
    Upload {
        path: String,
        key: String,
        reason: String,
    },

    #[error("Failed to delete local file {path}: {reason}")]
    Delete { path: String, reason: String },

    #[error("Backup completed with {errors} errors")]
    Aggregate { errors: usize },

    #[error("AWS SDK S3 error: {0}")]
    S3Sdk(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
