// logbackuptool/src/selection/date_pattern.rs
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::errors::{AppError, Result};

/// One recognisable way a date can be embedded in a filename.
pub struct DateShape {
    /// Token operators write in glob templates for this shape.
    pub token: &'static str,
    regex: Regex,
}

impl DateShape {
    fn new(token: &'static str, pattern: &str) -> Self {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("built-in date pattern {} is invalid: {}", pattern, e));
        DateShape { token, regex }
    }

    /// Parses the leftmost occurrence of this shape, if any.
    ///
    /// `None` means the shape does not occur; `Some(Err(_))` means it occurs
    /// but is not a real calendar date.
    fn extract(&self, filename: &str) -> Option<Result<NaiveDate>> {
        let caps = self.regex.captures(filename)?;
        let matched = &caps[0];
        Some(date_from_captures(&caps).ok_or_else(|| {
            AppError::DateExtraction(format!(
                "failed to parse {} date {} in filename {}",
                self.token, matched, filename
            ))
        }))
    }
}

fn date_from_captures(caps: &Captures<'_>) -> Option<NaiveDate> {
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Date shapes in priority order: the first shape that occurs wins.
pub static DATE_SHAPES: LazyLock<[DateShape; 4]> = LazyLock::new(|| {
    [
        DateShape::new("YYYYMMDD", r"([0-9]{4})([0-9]{2})([0-9]{2})"),
        DateShape::new("YYYY-MM-DD", r"([0-9]{4})-([0-9]{2})-([0-9]{2})"),
        DateShape::new("YYYY/MM/DD", r"([0-9]{4})/([0-9]{2})/([0-9]{2})"),
        DateShape::new("YYYY_MM_DD", r"([0-9]{4})_([0-9]{2})_([0-9]{2})"),
    ]
});

/// Tokens replaced by the glob translator, longest first so that
/// `YYYY-MM-DD` is consumed before anything it could overlap with.
const GLOB_TOKENS: [&str; 4] = ["YYYY/MM/DD", "YYYY-MM-DD", "YYYY_MM_DD", "YYYYMMDD"];

pub const PATTERN_EXAMPLES: &str = "\n\nExamples:\n  *YYYYMMDD.log.gz           - Matches app20241215.log.gz\n  YYYY-MM-DD.gz              - Matches 2024-12-15.gz\n  YYYY/MM/DD.gz              - Matches 2024/12/15.gz\n  YYYY_MM_DD.gz              - Matches 2024_12_15.gz\n  /var/log/app*YYYYMMDD.gz   - Matches /var/log/app20241215.gz\n  nginx-YYYY-MM-DD.log.gz    - Matches nginx-2024-12-15.log.gz\n  access_YYYY/MM/DD.log.gz   - Matches access_2024/12/15.log.gz";

/// Extracts the calendar date embedded in a filename.
pub fn extract_date_from_filename(filename: &str) -> Result<NaiveDate> {
    DATE_SHAPES
        .iter()
        .find_map(|shape| shape.extract(filename))
        .unwrap_or_else(|| {
            Err(AppError::DateExtraction(format!(
                "no date pattern found in filename: {}",
                filename
            )))
        })
}

/// Rewrites every date token in a glob template into a single `*`.
pub fn convert_glob_pattern(pattern: &str) -> String {
    GLOB_TOKENS
        .iter()
        .fold(pattern.to_string(), |acc, token| acc.replace(token, "*"))
}

/// Whether a glob template names at least one date shape.
pub fn contains_date_token(pattern: &str) -> bool {
    GLOB_TOKENS.iter().any(|token| pattern.contains(token))
}
