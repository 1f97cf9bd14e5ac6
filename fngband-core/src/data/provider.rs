//! Feed provider trait, raw feed records, and structured data errors.
//!
//! The `FeedProvider` trait abstracts over where raw index readings come from
//! so the incremental builder can be driven by the live API or by a scripted
//! provider in tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A scalar the feed may send either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedScalar {
    Number(f64),
    Text(String),
}

impl FeedScalar {
    /// Numeric reading, parsing text if needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeedScalar::Number(n) => Some(*n),
            FeedScalar::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Integer reading; fractional numbers are rejected.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FeedScalar::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            FeedScalar::Number(_) => None,
            FeedScalar::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

impl fmt::Display for FeedScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedScalar::Number(n) => write!(f, "{n}"),
            FeedScalar::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<f64> for FeedScalar {
    fn from(n: f64) -> Self {
        FeedScalar::Number(n)
    }
}

impl From<i64> for FeedScalar {
    fn from(n: i64) -> Self {
        FeedScalar::Number(n as f64)
    }
}

impl From<&str> for FeedScalar {
    fn from(s: &str) -> Self {
        FeedScalar::Text(s.to_string())
    }
}

/// One reading as delivered by the feed, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFeedRecord {
    /// Seconds since the Unix epoch.
    pub timestamp: FeedScalar,
    pub value: FeedScalar,
    #[serde(default)]
    pub value_classification: String,
}

impl RawFeedRecord {
    pub fn new(
        timestamp: impl Into<FeedScalar>,
        value: impl Into<FeedScalar>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: value.into(),
            value_classification: label.into(),
        }
    }
}

/// Structured error types for data operations.
///
/// These are designed to be displayable in CLI context.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("feed reported an error: {0}")]
    FeedError(String),

    #[error("hard stop: feed provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("non-numeric value {raw} in feed row {row}")]
    InvalidValue { row: usize, raw: String },

    #[error("invalid timestamp {raw} in feed row {row}")]
    InvalidTimestamp { row: usize, raw: String },

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Source of raw index readings.
///
/// Implementations handle transport details. The cache and the incremental
/// builder sit above this trait; providers know about neither.
pub trait FeedProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the `limit` most recent daily readings; `limit == 0` asks for
    /// the full history.
    fn fetch(&self, limit: usize) -> Result<Vec<RawFeedRecord>, DataError>;

    /// Whether the provider currently accepts requests.
    fn is_available(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_accept_numbers_and_strings() {
        let rec: RawFeedRecord = serde_json::from_str(
            r#"{"value":"40","value_classification":"Fear","timestamp":"1551157200"}"#,
        )
        .unwrap();
        assert_eq!(rec.value.as_f64(), Some(40.0));
        assert_eq!(rec.timestamp.as_i64(), Some(1_551_157_200));

        let rec: RawFeedRecord =
            serde_json::from_str(r#"{"value":40,"timestamp":1551157200}"#).unwrap();
        assert_eq!(rec.value.as_f64(), Some(40.0));
        assert_eq!(rec.timestamp.as_i64(), Some(1_551_157_200));
        assert_eq!(rec.value_classification, "");
    }

    #[test]
    fn non_numeric_text_does_not_convert() {
        assert_eq!(FeedScalar::from("n/a").as_f64(), None);
        assert_eq!(FeedScalar::from(1.5).as_i64(), None);
    }
}
