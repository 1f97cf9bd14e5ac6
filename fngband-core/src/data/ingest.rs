//! Raw feed rows → validated `Series`.
//!
//! The batch either converts completely or fails: a single non-numeric value
//! or unreadable timestamp rejects every row, so no partially parsed series
//! ever leaves this module.

use super::provider::{DataError, RawFeedRecord};
use crate::domain::{timestamp_to_local_date, DailyRecord, Series};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Counters from one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub rows: usize,
    /// Zero or negative placeholder values.
    pub dropped_non_positive: usize,
    /// Values above the index maximum.
    pub dropped_out_of_range: usize,
    /// Rows dated before the requested start date.
    pub dropped_before_start: usize,
}

/// Convert feed rows to a series, keeping only dates `>= start` when given.
pub fn ingest(
    rows: Vec<RawFeedRecord>,
    start: Option<NaiveDate>,
) -> Result<(Series, IngestReport), DataError> {
    let mut report = IngestReport {
        rows: rows.len(),
        ..IngestReport::default()
    };
    let mut records = Vec::with_capacity(rows.len());

    for (row, raw) in rows.into_iter().enumerate() {
        let ts = raw.timestamp.as_i64().ok_or_else(|| DataError::InvalidTimestamp {
            row,
            raw: raw.timestamp.to_string(),
        })?;
        let date = timestamp_to_local_date(ts).ok_or_else(|| DataError::InvalidTimestamp {
            row,
            raw: raw.timestamp.to_string(),
        })?;
        let value = raw.value.as_f64().ok_or_else(|| DataError::InvalidValue {
            row,
            raw: raw.value.to_string(),
        })?;

        if value.is_nan() || value <= 0.0 {
            report.dropped_non_positive += 1;
            continue;
        }
        if value > crate::domain::record::VALUE_MAX {
            report.dropped_out_of_range += 1;
            continue;
        }
        if start.is_some_and(|s| date < s) {
            report.dropped_before_start += 1;
            continue;
        }

        records.push(DailyRecord::new(date, value, raw.value_classification));
    }

    if report.dropped_out_of_range > 0 {
        warn!(count = report.dropped_out_of_range, "dropped feed rows above 100");
    }
    debug!(?report, "ingested feed rows");

    let series =
        Series::from_records(records).map_err(|e| DataError::ValidationError(e.to_string()))?;
    Ok((series, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn ts(y: i32, m: u32, d: u32) -> i64 {
        let noon = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Local.from_local_datetime(&noon).single().unwrap().timestamp()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn drops_placeholders_and_counts_them() {
        let rows = vec![
            RawFeedRecord::new(ts(2022, 1, 1), "10", "Extreme Fear"),
            RawFeedRecord::new(ts(2022, 1, 2), "0", ""),
            RawFeedRecord::new(ts(2022, 1, 3), "-4", ""),
            RawFeedRecord::new(ts(2022, 1, 4), "120", ""),
            RawFeedRecord::new(ts(2022, 1, 5), 90.0, "Extreme Greed"),
        ];

        let (series, report) = ingest(rows, None).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(d(2022, 1, 1)).unwrap().label, "Extreme Fear");
        assert_eq!(series.get(d(2022, 1, 5)).unwrap().value, 90.0);
        assert_eq!(report.dropped_non_positive, 2);
        assert_eq!(report.dropped_out_of_range, 1);
    }

    #[test]
    fn non_numeric_value_fails_the_batch() {
        let rows = vec![
            RawFeedRecord::new(ts(2022, 1, 1), "10", ""),
            RawFeedRecord::new(ts(2022, 1, 2), "forty", ""),
        ];
        let err = ingest(rows, None).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { row: 1, .. }));
    }

    #[test]
    fn bad_timestamp_fails_the_batch() {
        let rows = vec![RawFeedRecord::new("yesterday", "10", "")];
        assert!(matches!(
            ingest(rows, None),
            Err(DataError::InvalidTimestamp { row: 0, .. })
        ));
    }

    #[test]
    fn start_date_drops_older_rows() {
        let rows = (1..=5)
            .rev()
            .map(|day| RawFeedRecord::new(ts(2022, 1, day), 20.0 + day as f64, ""))
            .collect();

        let (series, report) = ingest(rows, Some(d(2022, 1, 3))).unwrap();
        assert_eq!(series.first_date(), Some(d(2022, 1, 3)));
        assert_eq!(series.len(), 3);
        assert_eq!(report.dropped_before_start, 2);
    }
}
