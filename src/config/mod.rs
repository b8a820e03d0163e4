// logbackuptool/src/config/mod.rs
use chrono::Duration;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use crate::cli::{Cli, DEFAULT_LOCK_FILE, DEFAULT_STORAGE_CLASS};
use crate::errors::{AppError, Result};
use crate::selection::date_pattern::{PATTERN_EXAMPLES, contains_date_token};
use crate::selection::period::parse_period;

// Structs for deserializing the optional --config JSON file.
// Every field is optional; command-line values take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJsonConfig {
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub region: Option<String>,
    pub output: Option<PathBuf>,
    pub lock: Option<String>,
    pub storage_class: Option<String>,
    pub dry_run: Option<bool>,
    pub verbose: Option<bool>,
    pub delete_after_upload: Option<bool>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub no_verify_ssl: Option<bool>,
    pub ca_bundle: Option<PathBuf>,
    pub cli_read_timeout: Option<u64>,
    pub cli_connect_timeout: Option<u64>,
}

impl RawJsonConfig {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            ))
        })?;
        serde_json::from_str(&config_content).map_err(|e| {
            AppError::Config(format!(
                "Failed to parse JSON from config file at {}: {}",
                config_path.display(),
                e
            ))
        })
    }
}

/// Settings handed to the S3 client builder. Opaque to the selection engine.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub no_verify_ssl: bool,
    pub ca_bundle: Option<PathBuf>,
    pub read_timeout: Option<StdDuration>,
    pub connect_timeout: Option<StdDuration>,
}

/// Immutable inputs for one invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pattern: String,
    pub period: String,
    pub retention: Duration,
    pub bucket: String,
    pub prefix: String,
    pub storage_class: String,
    pub delete_after_upload: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub lock_path: PathBuf,
    pub output_file: Option<PathBuf>,
    pub transport: TransportConfig,
}

impl RunConfig {
    /// Merges command-line values over the optional JSON file and validates
    /// the result. All problems are reported together in one error.
    pub fn from_sources(cli: &Cli, file: Option<&RawJsonConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();
        let mut problems = Vec::new();

        let retention = match parse_period(&cli.period) {
            Ok(duration) => Some(duration),
            Err(e) => {
                problems.push(format!("invalid period '{}': {}", cli.period, strip_kind(e)));
                None
            }
        };

        if !contains_date_token(&cli.pattern) {
            problems.push(format!(
                "invalid glob pattern. Must contain 'YYYYMMDD', 'YYYY-MM-DD', 'YYYY/MM/DD', or 'YYYY_MM_DD'{}",
                PATTERN_EXAMPLES
            ));
        }

        let bucket = non_empty(cli.bucket.clone().or(file.bucket));
        if bucket.is_none() {
            problems.push("S3 bucket name is required (use --bucket)".to_string());
        }
        let prefix = non_empty(cli.prefix.clone().or(file.prefix));
        match &prefix {
            None => problems.push("S3 prefix is required (use --prefix)".to_string()),
            // Keys would start with '/' once the trailing slash is trimmed.
            Some(p) if p.trim_matches('/').is_empty() => {
                problems.push(format!("S3 prefix must contain more than slashes: '{}'", p))
            }
            Some(_) => {}
        }

        let endpoint_url = non_empty(cli.endpoint_url.clone().or(file.endpoint_url));
        if let Some(endpoint) = &endpoint_url {
            if let Err(e) = url::Url::parse(endpoint) {
                problems.push(format!("invalid endpoint URL '{}': {}", endpoint, e));
            }
        }

        let (Some(retention), Some(bucket), Some(prefix), true) =
            (retention, bucket, prefix, problems.is_empty())
        else {
            return Err(AppError::Config(problems.join("\n")));
        };

        Ok(RunConfig {
            pattern: cli.pattern.clone(),
            period: cli.period.clone(),
            retention,
            bucket,
            prefix,
            storage_class: non_empty(cli.storage_class.clone().or(file.storage_class))
                .unwrap_or_else(|| DEFAULT_STORAGE_CLASS.to_string()),
            delete_after_upload: cli.delete_after_upload || file.delete_after_upload.unwrap_or(false),
            dry_run: cli.dry_run || file.dry_run.unwrap_or(false),
            verbose: cli.verbose || file.verbose.unwrap_or(false),
            lock_path: PathBuf::from(
                cli.lock
                    .clone()
                    .or(file.lock)
                    .unwrap_or_else(|| DEFAULT_LOCK_FILE.to_string()),
            ),
            output_file: cli.output.clone().or(file.output),
            transport: TransportConfig {
                region: non_empty(cli.region.clone().or(file.region)),
                profile: non_empty(cli.profile.clone().or(file.profile)),
                endpoint_url,
                no_verify_ssl: cli.no_verify_ssl || file.no_verify_ssl.unwrap_or(false),
                ca_bundle: cli.ca_bundle.clone().or(file.ca_bundle),
                read_timeout: seconds(cli.cli_read_timeout.or(file.cli_read_timeout)),
                connect_timeout: seconds(cli.cli_connect_timeout.or(file.cli_connect_timeout)),
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// 0 means "no timeout", matching the AWS CLI flags.
fn seconds(value: Option<u64>) -> Option<StdDuration> {
    value.filter(|s| *s > 0).map(StdDuration::from_secs)
}

fn strip_kind(err: AppError) -> String {
    match err {
        AppError::Config(msg) => msg,
        other => other.to_string(),
    }
}
