//! On-disk series cache.
//!
//! Layout: `{cache_dir}/{key}.csv` with a `{key}.meta.json` sidecar, where
//! `key` is derived from indicator, period and source (e.g. `fng_1d_alternative`).
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Date-indexed rows, ascending, one per date
//! - Validation on load (header, value range)
//! - Quarantine for corrupt files ({filename}.quarantined); read failures
//!   are reported and leave the file in place
//! - Metadata sidecar (hash, date range, record count)

use super::provider::DataError;
use crate::domain::{DailyRecord, Series};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persistent store for a single series.
pub trait SeriesCache: Send + Sync {
    /// Identifier of the cached series.
    fn key(&self) -> &str;

    /// Load the cached series. `Ok(None)` when nothing usable is cached.
    fn load(&self) -> Result<Option<Series>, DataError>;

    /// Replace the cached series.
    fn save(&self, series: &Series) -> Result<(), DataError>;
}

/// Metadata sidecar for a cached series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub key: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub record_count: usize,
    pub data_hash: String,
    pub cached_at: chrono::NaiveDateTime,
}

/// Cache status for a series key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub key: String,
    pub cached: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub record_count: Option<usize>,
}

/// One CSV row. Column names follow the indicator table layout.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    close: f64,
    #[serde(default)]
    close_name: String,
}

pub struct CsvSeriesCache {
    cache_dir: PathBuf,
    key: String,
}

impl CsvSeriesCache {
    /// Cache for `key` under `cache_dir`. Nothing is touched on disk until `save`.
    pub fn new(cache_dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            key: key.into(),
        }
    }

    /// Directory holding the data file and its sidecar.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// `{cache_dir}/{key}.csv`
    pub fn data_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", self.key))
    }

    /// `{cache_dir}/{key}.meta.json`
    pub fn meta_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.meta.json", self.key))
    }

    /// Metadata sidecar, or `None` if it is missing or unreadable.
    pub fn get_meta(&self) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Cache status from the sidecar. `cached` also requires the data file.
    pub fn status(&self) -> CacheStatus {
        let meta = self.get_meta();
        CacheStatus {
            key: self.key.clone(),
            cached: meta.is_some() && self.data_path().exists(),
            start_date: meta.as_ref().map(|m| m.start_date),
            end_date: meta.as_ref().map(|m| m.end_date),
            record_count: meta.as_ref().map(|m| m.record_count),
        }
    }

    fn quarantine(&self, path: &Path, reason: &DataError) {
        let quarantined = path.with_extension("csv.quarantined");
        warn!(
            path = %path.display(),
            error = %reason,
            "quarantining corrupt cache file"
        );
        if let Err(e) = fs::rename(path, &quarantined) {
            warn!(path = %path.display(), error = %e, "quarantine rename failed");
        }
    }
}

impl SeriesCache for CsvSeriesCache {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<Series>, DataError> {
        let path = self.data_path();
        if !path.exists() {
            debug!(key = %self.key, "no cache file");
            return Ok(None);
        }

        match read_csv(&path) {
            Ok(series) if series.is_empty() => Ok(None),
            Ok(series) => {
                debug!(key = %self.key, records = series.len(), "loaded cached series");
                Ok(Some(series))
            }
            Err(e @ DataError::ValidationError(_)) => {
                self.quarantine(&path, &e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, series: &Series) -> Result<(), DataError> {
        let (start_date, end_date) = match (series.first_date(), series.last_date()) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(DataError::CacheError("no records to cache".into())),
        };

        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let path = self.data_path();
        let tmp_path = path.with_extension("csv.tmp");
        let bytes = write_csv(series)?;

        fs::write(&tmp_path, &bytes)
            .map_err(|e| DataError::CacheError(format!("write temp file: {e}")))?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheError(format!("atomic rename failed: {e}"))
        })?;

        let meta = CacheMeta {
            key: self.key.clone(),
            start_date,
            end_date,
            record_count: series.len(),
            data_hash: blake3::hash(&bytes).to_hex().to_string(),
            cached_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::CacheError(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(), meta_json)
            .map_err(|e| DataError::CacheError(format!("meta write: {e}")))?;

        debug!(key = %self.key, records = series.len(), "saved series to cache");
        Ok(())
    }
}

// ── CSV helpers ─────────────────────────────────────────────────────

fn write_csv(series: &Series) -> Result<Vec<u8>, DataError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in series {
        writer
            .serialize(CsvRow {
                date: record.date,
                close: record.value,
                close_name: record.label.clone(),
            })
            .map_err(|e| DataError::CacheError(format!("csv encode: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| DataError::CacheError(format!("csv flush: {e}")))
}

fn read_csv(path: &Path) -> Result<Series, DataError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| DataError::CacheError(format!("open {}: {e}", path.display())))?;

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| {
            if e.is_io_error() {
                DataError::CacheError(format!("read {}: {e}", path.display()))
            } else {
                DataError::ValidationError(format!("row {i}: {e}"))
            }
        })?;
        records.push(DailyRecord::new(row.date, row.close, row.close_name));
    }

    Series::from_records(records).map_err(|e| DataError::ValidationError(e.to_string()))
}
