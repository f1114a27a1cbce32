//! Inclusive publish-date window / 发布日期窗口
//!
//! Validation only targets parseability: an `after` later than `before` is
//! accepted and simply matches nothing at the index.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{DateField, SearchError};

/// Canonical calendar date format / 日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Window length used when the caller omits a bound / 默认窗口天数
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    after: NaiveDate,
    before: NaiveDate,
}

/// How a window was obtained / 窗口来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOrigin {
    Supplied,
    Defaulted,
}

impl DateWindow {
    pub fn new(after: NaiveDate, before: NaiveDate) -> Self {
        Self { after, before }
    }

    /// `[today - days, today]`; a span past the calendar's range starts at its first day
    pub fn ending_on(today: NaiveDate, days: i64) -> Self {
        let after = TimeDelta::try_days(days.max(0))
            .and_then(|span| today.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        Self { after, before: today }
    }

    /// Parse both bounds strictly, or default to the window ending `today`.
    ///
    /// Bounds are only honoured when both are present and non-empty. `before`
    /// is validated first, so it is the field reported when both are bad.
    pub fn resolve(
        raw_after: Option<&str>,
        raw_before: Option<&str>,
        today: NaiveDate,
        default_days: i64,
    ) -> Result<(Self, WindowOrigin), SearchError> {
        let raw_after = raw_after.filter(|s| !s.is_empty());
        let raw_before = raw_before.filter(|s| !s.is_empty());

        match (raw_after, raw_before) {
            (Some(after), Some(before)) => {
                let before = parse_date(before, DateField::Before)?;
                let after = parse_date(after, DateField::After)?;
                Ok((Self::new(after, before), WindowOrigin::Supplied))
            }
            _ => Ok((Self::ending_on(today, default_days), WindowOrigin::Defaulted)),
        }
    }

    pub fn after(&self) -> NaiveDate {
        self.after
    }

    pub fn before(&self) -> NaiveDate {
        self.before
    }

    pub fn after_str(&self) -> String {
        self.after.format(DATE_FORMAT).to_string()
    }

    pub fn before_str(&self) -> String {
        self.before.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.after_str(), self.before_str())
    }
}

/// Strict `YYYY-MM-DD` parse / 严格解析日期
///
/// The value must re-render to exactly the same string, which rejects
/// impossible dates, missing zero padding and trailing text.
pub fn parse_date(raw: &str, field: DateField) -> Result<NaiveDate, SearchError> {
    let invalid = || SearchError::InvalidDateFormat { field };
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())?;
    if date.format(DATE_FORMAT).to_string() != raw {
        return Err(invalid());
    }
    Ok(date)
}
