//! One calendar date's index observation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lowest value the index can take.
pub const VALUE_MIN: f64 = 0.0;

/// Highest value the index can take.
pub const VALUE_MAX: f64 = 100.0;

/// A single daily observation of the index.
///
/// `label` is whatever classification string the feed attached to the value.
/// It is kept for display only; bands are always recomputed from `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub value: f64,
    pub label: String,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, value: f64, label: impl Into<String>) -> Self {
        Self {
            date,
            value,
            label: label.into(),
        }
    }

    /// True when the value is a usable observation: finite, strictly positive
    /// and no greater than [`VALUE_MAX`]. Zero is a feed placeholder.
    pub fn has_valid_value(&self) -> bool {
        is_valid_value(self.value)
    }
}

/// Value check shared by ingestion and cache loading.
pub fn is_valid_value(value: f64) -> bool {
    value.is_finite() && value > VALUE_MIN && value <= VALUE_MAX
}
