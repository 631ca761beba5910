//! # Report Periods
//!
//! A validated, end-inclusive date range.
//!
//! ```text
//!  from = 2024-01-01            to = 2024-01-31
//!     │                              │
//!     ▼                              ▼
//!  2024-01-01T00:00:00.000Z ... 2024-01-31T23:59:59.999Z
//!     start                          end
//! ```
//!
//! Calendar days are UTC days, matching how the store records timestamps.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// A validated report period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    from: NaiveDate,
    #[ts(as = "String")]
    to: NaiveDate,
}

impl DateRange {
    /// Creates a range, failing when `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvertedRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(DateRange { from, to })
    }

    /// A range covering the `days` calendar days that end on `to`.
    ///
    /// `trailing(to, 30)` covers `to - 29 ..= to`.
    pub fn trailing(to: NaiveDate, days: i64) -> Self {
        let from = to - Duration::days((days - 1).max(0));
        DateRange { from, to }
    }

    #[inline]
    pub fn from_date(&self) -> NaiveDate {
        self.from
    }

    #[inline]
    pub fn to_date(&self) -> NaiveDate {
        self.to
    }

    /// First instant of the range (00:00:00.000 of `from`).
    pub fn start(&self) -> DateTime<Utc> {
        self.from.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last instant of the range (23:59:59.999 of `to`).
    pub fn end(&self) -> DateTime<Utc> {
        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        self.to.and_time(end_of_day).and_utc()
    }

    /// Whether `instant` falls inside the range, both ends included.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start() && instant <= self.end()
    }

    /// Number of calendar days covered, both ends included (always ≥ 1).
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// Every calendar day in the range, in order.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        self.from.iter_days().take(self.days() as usize)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}
