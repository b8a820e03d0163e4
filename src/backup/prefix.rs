// logbackuptool/src/backup/prefix.rs
use chrono::{Datelike, NaiveDate};

use crate::errors::{AppError, Result};
use crate::selection::date_pattern::extract_date_from_filename;

const PREFIX_TOKENS: [&str; 3] = ["YYYY", "MM", "DD"];

/// True when the prefix asks for a date-partitioned layout.
pub fn has_date_tokens(prefix: &str) -> bool {
    PREFIX_TOKENS.iter().any(|token| prefix.contains(token))
}

/// Substitutes `YYYY`, `MM` and `DD` in `prefix` with parts of `date`.
pub fn process_prefix_with_date(prefix: &str, date: NaiveDate) -> String {
    prefix
        .replace("YYYY", &format!("{:04}", date.year()))
        .replace("MM", &format!("{:02}", date.month()))
        .replace("DD", &format!("{:02}", date.day()))
}

/// Builds `<prefix>/<filename>`, resolving date tokens from the filename.
pub fn resolve_destination_key(prefix: &str, filename: &str) -> Result<String> {
    let resolved = if has_date_tokens(prefix) {
        let file_date = extract_date_from_filename(filename).map_err(|e| {
            AppError::DateExtraction(format!(
                "failed to extract date from filename {} for date-based prefix: {}",
                filename, e
            ))
        })?;
        process_prefix_with_date(prefix, file_date)
    } else {
        prefix.to_string()
    };
    Ok(format!("{}/{}", resolved.trim_end_matches('/'), filename))
}
