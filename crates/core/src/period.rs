//! Monthly return periods.
//!
//! GST returns are filed per calendar month and the portal identifies a period
//! by the string `MMYYYY` (e.g. `042024` for April 2024).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Earliest period accepted: GST went live in July 2017.
const FIRST_GST_YEAR: i32 = 2017;
const FIRST_GST_MONTH: u32 = 7;

/// A calendar month for which a return is filed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReturnPeriod {
    year: i32,
    month: u32,
}

impl ValueObject for ReturnPeriod {}

impl ReturnPeriod {
    pub fn new(month: u32, year: i32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::invalid_period(format!(
                "month must be 1-12, got {month}"
            )));
        }
        if !(FIRST_GST_YEAR..=9999).contains(&year) {
            return Err(DomainError::invalid_period(format!(
                "year must be between {FIRST_GST_YEAR} and 9999, got {year}"
            )));
        }
        if year == FIRST_GST_YEAR && month < FIRST_GST_MONTH {
            return Err(DomainError::invalid_period(format!(
                "GST periods start at {FIRST_GST_MONTH:02}{FIRST_GST_YEAR}, got {month:02}{year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Parse the portal's `MMYYYY` form.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_period(format!(
                "expected MMYYYY, got {raw:?}"
            )));
        }
        let month = raw[..2]
            .parse::<u32>()
            .map_err(|e| DomainError::invalid_period(e.to_string()))?;
        let year = raw[2..]
            .parse::<i32>()
            .map_err(|e| DomainError::invalid_period(e.to_string()))?;
        Self::new(month, year)
    }

    /// Period containing `date`.
    pub fn containing(date: NaiveDate) -> DomainResult<Self> {
        Self::new(date.month(), date.year())
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> NaiveDate {
        // Month and year are validated on construction.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Inclusive `(from, to)` date range covered by the period.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.first_day(), self.last_day())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn previous(&self) -> Option<Self> {
        if self.month == 1 {
            Self::new(12, self.year - 1).ok()
        } else {
            Self::new(self.month - 1, self.year).ok()
        }
    }

    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            Self::new(1, self.year + 1).ok()
        } else {
            Self::new(self.month + 1, self.year).ok()
        }
    }

    /// Indian financial year (April to March) label, e.g. `2024-25`.
    pub fn financial_year(&self) -> String {
        let start = if self.month >= 4 { self.year } else { self.year - 1 };
        format!("{}-{:02}", start, (start + 1) % 100)
    }
}

impl core::fmt::Display for ReturnPeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}{:04}", self.month, self.year)
    }
}

impl core::str::FromStr for ReturnPeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReturnPeriod {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReturnPeriod> for String {
    fn from(value: ReturnPeriod) -> Self {
        value.to_string()
    }
}
