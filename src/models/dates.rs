//! Calendar date handling for rental ranges
//!
//! Rentals are booked by whole calendar days. Clients may send either a
//! plain `YYYY-MM-DD` date or a full RFC 3339 timestamp; timestamps are
//! truncated to their UTC calendar day so that the same request always
//! lands on the same dates regardless of the caller's timezone.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::{AppError, AppResult};

/// Parse a calendar date, truncating timestamps to the UTC day
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD or RFC 3339", value))
}

/// Serde helper for required calendar date fields
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(serde::de::Error::custom)
}

/// Serde helper for optional calendar date fields (blank strings count as absent)
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(s) if !s.trim().is_empty() => parse_calendar_date(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Closed calendar range `[start, end]`, with `end >= start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if end < start {
            return Err(AppError::Validation(format!(
                "End date {} precedes start date {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Build a range only when both ends are known
    pub fn from_optional(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<Option<Self>> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            _ => Ok(None),
        }
    }
}
