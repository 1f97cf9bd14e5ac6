//! Date-indexed, deduplicated series of daily records.
//!
//! A `Series` holds at most one record per date and iterates in ascending
//! date order. It is never mutated in place once handed to the query engine:
//! refreshes build a new series via [`Series::merged_with`].

use super::record::{is_valid_value, DailyRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("invalid value {value} at {date}: must be in (0, 100]")]
    InvalidValue { date: NaiveDate, value: f64 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    records: BTreeMap<NaiveDate, DailyRecord>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from records in any order.
    ///
    /// Later records replace earlier ones on the same date. Any record with a
    /// value outside (0, 100] rejects the whole batch.
    pub fn from_records<I>(records: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = DailyRecord>,
    {
        let mut map = BTreeMap::new();
        for record in records {
            if !is_valid_value(record.value) {
                return Err(SeriesError::InvalidValue {
                    date: record.date,
                    value: record.value,
                });
            }
            map.insert(record.date, record);
        }
        Ok(Self { records: map })
    }

    /// Number of distinct dates.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest date, `None` when empty.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.keys().next().copied()
    }

    /// Latest date, `None` when empty.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.keys().next_back().copied()
    }

    /// Record on exactly `date`.
    pub fn get(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records.get(&date)
    }

    /// Records in ascending date order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DailyRecord> + ExactSizeIterator {
        self.records.values()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.records.keys().copied()
    }

    /// Sub-series with dates `>= start`.
    pub fn range_from(&self, start: NaiveDate) -> Series {
        Self {
            records: self
                .records
                .range(start..)
                .map(|(d, r)| (*d, r.clone()))
                .collect(),
        }
    }

    /// Sub-series with dates in `[start, end]`. Either bound may be open.
    pub fn range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Series {
        Self {
            records: self
                .records
                .iter()
                .filter(|(d, _)| start.map_or(true, |s| **d >= s))
                .filter(|(d, _)| end.map_or(true, |e| **d <= e))
                .map(|(d, r)| (*d, r.clone()))
                .collect(),
        }
    }

    /// New series containing every record of `self` plus `newer`; records
    /// from `newer` win on shared dates.
    pub fn merged_with(&self, newer: &Series) -> Series {
        let mut records = self.records.clone();
        for (date, record) in &newer.records {
            records.insert(*date, record.clone());
        }
        Self { records }
    }

    /// Records of `self` that `known` does not already hold verbatim: dates
    /// missing from `known`, or dates whose value or label changed.
    pub fn delta_against(&self, known: &Series) -> Series {
        Self {
            records: self
                .records
                .iter()
                .filter(|(date, record)| known.get(**date) != Some(*record))
                .map(|(d, r)| (*d, r.clone()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a DailyRecord;
    type IntoIter = std::collections::btree_map::Values<'a, NaiveDate, DailyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
