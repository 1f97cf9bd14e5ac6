//! Date normalization at the query boundary.
//!
//! Callers hand in strings, dates, datetimes or epoch timestamps; everything
//! past this module works with a single `NaiveDate`.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DateParseError {
    #[error("unrecognized date '{0}' (expected YYYY-MM-DD, RFC 3339 or epoch seconds)")]
    Unrecognized(String),

    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(i64),
}

/// Earliest date the feed can be asked about. A missing start date
/// normalizes to this value.
pub fn earliest_supported_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Any date-like value accepted by query-facing APIs.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Seconds since the Unix epoch, read on the local calendar.
    Timestamp(i64),
}

impl DateInput {
    /// Calendar date for this input.
    pub fn to_date(&self) -> Result<NaiveDate, DateParseError> {
        match self {
            DateInput::Text(s) => parse_any_date(s),
            DateInput::Date(d) => Ok(*d),
            DateInput::DateTime(dt) => Ok(dt.date()),
            DateInput::Timestamp(ts) => {
                timestamp_to_local_date(*ts).ok_or(DateParseError::TimestampOutOfRange(*ts))
            }
        }
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self {
        DateInput::Date(d)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(dt: NaiveDateTime) -> Self {
        DateInput::DateTime(dt)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(dt: DateTime<Tz>) -> Self {
        DateInput::DateTime(dt.naive_local())
    }
}

impl From<i64> for DateInput {
    fn from(ts: i64) -> Self {
        DateInput::Timestamp(ts)
    }
}

/// Seconds since the epoch to a calendar date in the local time zone.
pub fn timestamp_to_local_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&Local).date_naive())
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a textual date.
///
/// Accepts `YYYY-MM-DD` (also `/` separated or compact `YYYYMMDD`), naive
/// datetimes, RFC 3339, and bare epoch seconds.
pub fn parse_any_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let s = input.trim();

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(ts) = s.parse::<i64>() {
            return timestamp_to_local_date(ts).ok_or(DateParseError::TimestampOutOfRange(ts));
        }
    }

    Err(DateParseError::Unrecognized(input.to_string()))
}
