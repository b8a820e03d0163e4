//! Selection of aged log files by the date embedded in their names.

pub(crate) mod date_pattern;
pub(crate) mod period;

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::errors::{AppError, Result};
use date_pattern::{convert_glob_pattern, extract_date_from_filename};
use period::CutoffTime;

/// A local file chosen for backup, paired with the date found in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFile {
    pub path: PathBuf,
    pub date: NaiveDate,
}

impl TargetFile {
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

/// Outcome of scanning the filesystem: candidates in enumeration order and
/// the number of matched files that were passed over.
#[derive(Debug, Default)]
pub struct Selection {
    pub targets: Vec<TargetFile>,
    pub skipped: usize,
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Finds regular files matching `glob_template` whose embedded date is
/// strictly before `cutoff`.
///
/// Files without a recognisable date, or dated on/after the cutoff, are
/// counted as skipped. Only an invalid glob is an error.
pub fn find_target_files(glob_template: &str, cutoff: &CutoffTime) -> Result<Selection> {
    info!("Searching for files matching pattern: {}", glob_template);
    info!("Cutoff time: {}", cutoff);

    let search_pattern = convert_glob_pattern(glob_template);
    info!("Converted search pattern: {}", search_pattern);

    let matches = glob::glob(&search_pattern).map_err(|e| {
        AppError::Config(format!("failed to glob pattern {}: {}", search_pattern, e))
    })?;

    let mut selection = Selection::default();
    for entry in matches {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Could not read glob match: {}", e);
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }

        let filename = file_name_of(&path);
        let file_date = match extract_date_from_filename(&filename) {
            Ok(date) => date,
            Err(e) => {
                info!("Could not extract date from filename: {} ({})", path.display(), e);
                selection.skipped += 1;
                continue;
            }
        };

        if cutoff.is_eligible(file_date) {
            info!("Target file found: {} (date: {})", path.display(), file_date);
            selection.targets.push(TargetFile {
                path,
                date: file_date,
            });
        } else {
            info!("File skipped (too recent): {} (date: {})", path.display(), file_date);
            selection.skipped += 1;
        }
    }

    Ok(selection)
}
