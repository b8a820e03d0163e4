use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_LOCK_FILE: &str = "/var/run/backup-log-to-s3.lock";
pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD_IA";

/// Uploads aged, date-named log files to S3.
///
/// Only files whose filename date is older than <PERIOD> are processed.
/// Local files are kept unless --delete is given.
///
/// ## Examples
///
///   logbackuptool --bucket my-logs --prefix logs "1 day" "*YYYYMMDD.log.gz"
///
///   logbackuptool --bucket my-logs --prefix "logs/YYYY/MM/DD" "1 month" "/var/log/app*YYYYMMDD.gz"
///     # Saves to: my-logs/logs/2024/12/15/app20241215.gz
///
///   logbackuptool --bucket my-logs --prefix logs --dry-run "7 days" "nginx-YYYY-MM-DD.log.gz"
#[derive(Debug, Parser)]
#[command(name = "logbackuptool", version, about, long_about)]
pub struct Cli {
    /// Time period, e.g. "1 day", "7 days", "1 month", "1 year"
    pub period: String,

    /// File pattern containing YYYYMMDD, YYYY-MM-DD, YYYY/MM/DD or YYYY_MM_DD
    pub pattern: String,

    // === Destination ===
    /// S3 bucket name (required)
    #[arg(short, long, env = "LOGBACKUP_BUCKET")]
    pub bucket: Option<String>,

    /// S3 prefix; YYYY, MM and DD are replaced with the filename's date (required)
    #[arg(short, long, env = "LOGBACKUP_PREFIX")]
    pub prefix: Option<String>,

    /// S3 storage class [default: STANDARD_IA]
    #[arg(long)]
    pub storage_class: Option<String>,

    // === Run behaviour ===
    /// Output log file path (logs to stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Lock file path; pass an empty string to disable locking
    /// [default: /var/run/backup-log-to-s3.lock]
    #[arg(long)]
    pub lock: Option<String>,

    /// Log intended uploads and deletions without performing them
    #[arg(long)]
    pub dry_run: bool,

    /// Debug-level logging, also echoed to stdout when --output is set
    #[arg(short, long)]
    pub verbose: bool,

    /// Delete local files after a successful upload
    #[arg(long = "delete")]
    pub delete_after_upload: bool,

    /// JSON file providing defaults for any of these options
    #[arg(long)]
    pub config: Option<PathBuf>,

    // === AWS CLI compatible options ===
    /// AWS region (falls back to the SDK's environment and profile lookup)
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Use a specific profile from your credential file
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Override the default S3 endpoint URL
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Do not verify SSL certificates
    #[arg(long)]
    pub no_verify_ssl: bool,

    /// CA certificate bundle to use when verifying SSL certificates
    #[arg(long)]
    pub ca_bundle: Option<PathBuf>,

    /// Maximum socket read time in seconds (0 means no timeout)
    #[arg(long)]
    pub cli_read_timeout: Option<u64>,

    /// Maximum socket connect time in seconds (0 means no timeout)
    #[arg(long)]
    pub cli_connect_timeout: Option<u64>,
}
