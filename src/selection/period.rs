// logbackuptool/src/selection/period.rs
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;

use crate::errors::{AppError, Result};

const PERIOD_EXAMPLES: &str = "\n\nExamples:\n  \"1 day\"     - Files older than 1 day\n  \"7 days\"    - Files older than 7 days\n  \"1 month\"   - Files older than 1 month\n  \"2 months\"  - Files older than 2 months\n  \"1 year\"    - Files older than 1 year";

// Calendar-naive on purpose: a month is 30 days and a year is 365 days.
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = 365;

/// Parses a retention period such as `"7 days"` or `"1 month"` into a duration.
///
/// The unit is case-insensitive and must be one of day(s), month(s), year(s).
/// A negative count is accepted and moves the cutoff into the future.
pub fn parse_period(period: &str) -> Result<Duration> {
    let parts: Vec<&str> = period.split_whitespace().collect();
    let [value, unit] = parts.as_slice() else {
        return Err(AppError::Config(format!(
            "invalid period format '{}'. Expected format: '1 day', '7 days', '1 month', etc.{}",
            period, PERIOD_EXAMPLES
        )));
    };

    let count: i64 = value.parse().map_err(|_| {
        AppError::Config(format!("invalid numeric value: {}{}", value, PERIOD_EXAMPLES))
    })?;

    let days_per_unit = match unit.to_lowercase().as_str() {
        "day" | "days" => 1,
        "month" | "months" => DAYS_PER_MONTH,
        "year" | "years" => DAYS_PER_YEAR,
        other => {
            return Err(AppError::Config(format!(
                "unsupported time unit: {}. Supported units: day/days, month/months, year/years{}",
                other, PERIOD_EXAMPLES
            )));
        }
    };

    count
        .checked_mul(days_per_unit)
        .and_then(Duration::try_days)
        .ok_or_else(|| {
            AppError::Config(format!("period is too large: {}{}", period, PERIOD_EXAMPLES))
        })
}

/// Start of the first calendar day that is no longer eligible for backup.
///
/// A file dated strictly before [`CutoffTime::date`] is a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffTime {
    date: NaiveDate,
}

impl CutoffTime {
    /// Subtracts `period` from `now`, truncates to that day's 00:00 in `now`'s
    /// timezone and advances one day, so "1 day" means "before today".
    pub fn compute<Tz: TimeZone>(now: &DateTime<Tz>, period: Duration) -> Self {
        let shifted_day = now
            .clone()
            .checked_sub_signed(period)
            .map(|t| t.date_naive())
            .unwrap_or(NaiveDate::MIN);
        let date = shifted_day.succ_opt().unwrap_or(shifted_day);
        CutoffTime { date }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(chrono::NaiveTime::MIN)
    }

    pub fn is_eligible(&self, file_date: NaiveDate) -> bool {
        file_date < self.date
    }
}

impl fmt::Display for CutoffTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start().format("%Y-%m-%d %H:%M:%S"))
    }
}
