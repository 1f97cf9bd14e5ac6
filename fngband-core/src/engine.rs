//! Date-scoped queries over a built series.
//!
//! The engine owns one immutable `Series` and a classifier over the static
//! band table. Every query takes an optional date and defaults to the latest
//! date in the series. Lookups are exact: no interpolation, no nearest date.
//!
//! The `*_on` queries accept anything convertible to `DateInput` (text,
//! dates, datetimes, epoch seconds) and normalize it through
//! `resolve_date` before the lookup.

use crate::bands::{BandClassifier, BandDetails};
use crate::data::{FngDataSource, SeriesCache};
use crate::domain::{DateInput, DateParseError, Series};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no indicator data available")]
    NoDataAvailable,

    #[error(transparent)]
    Data(#[from] crate::data::DataError),
}

#[derive(Debug, Clone)]
pub struct IndicatorQueryEngine {
    series: Series,
    classifier: BandClassifier,
    latest: NaiveDate,
}

impl IndicatorQueryEngine {
    /// Engine over `series`; fails if the series is empty.
    pub fn new(series: Series) -> Result<Self, EngineError> {
        Self::with_classifier(series, BandClassifier::default())
    }

    /// Engine over `series` using a custom classifier; fails if the series is empty.
    pub fn with_classifier(series: Series, classifier: BandClassifier) -> Result<Self, EngineError> {
        let latest = series.last_date().ok_or(EngineError::NoDataAvailable)?;
        Ok(Self {
            series,
            classifier,
            latest,
        })
    }

    /// Load through a data source (cache, then feed) and keep dates `>= start`.
    pub fn from_source<C: SeriesCache>(
        source: &FngDataSource<C>,
        start: Option<NaiveDate>,
        offline: bool,
    ) -> Result<Self, EngineError> {
        Self::new(source.series_from(start, offline)?)
    }

    /// The full series the engine answers from.
    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn classifier(&self) -> &BandClassifier {
        &self.classifier
    }

    /// Date used when a query omits its date.
    pub fn latest_date(&self) -> NaiveDate {
        self.latest
    }

    /// Normalize a date-like input to a calendar date; `None` is the latest
    /// date in the series.
    pub fn resolve_date<D: Into<DateInput>>(
        &self,
        at: Option<D>,
    ) -> Result<NaiveDate, DateParseError> {
        match at {
            Some(input) => input.into().to_date(),
            None => Ok(self.latest),
        }
    }

    /// `value_at` for any date-like input.
    pub fn value_on<D: Into<DateInput>>(
        &self,
        at: Option<D>,
    ) -> Result<Option<f64>, DateParseError> {
        Ok(self.value_at(Some(self.resolve_date(at)?)))
    }

    /// `band_at` for any date-like input.
    pub fn band_on<D: Into<DateInput>>(
        &self,
        at: Option<D>,
    ) -> Result<Option<usize>, DateParseError> {
        Ok(self.band_at(Some(self.resolve_date(at)?)))
    }

    /// `band_details_at` for any date-like input.
    pub fn band_details_on<D: Into<DateInput>>(
        &self,
        at: Option<D>,
    ) -> Result<Option<BandDetails>, DateParseError> {
        Ok(self.band_details_at(Some(self.resolve_date(at)?)))
    }

    /// Value stored at `at` (latest date when `None`), or `None` if the
    /// series has no record on that exact date.
    pub fn value_at(&self, at: Option<NaiveDate>) -> Option<f64> {
        let date = at.unwrap_or(self.latest);
        match self.series.get(date) {
            Some(record) => Some(record.value),
            None => {
                debug!(%date, "no index value at date");
                None
            }
        }
    }

    /// Band index at `at`.
    pub fn band_at(&self, at: Option<NaiveDate>) -> Option<usize> {
        self.classifier.classify(self.value_at(at))
    }

    /// Band details at `at`.
    pub fn band_details_at(&self, at: Option<NaiveDate>) -> Option<BandDetails> {
        self.band_at(at)
            .and_then(|index| self.classifier.describe(index))
    }

    /// Every date in the series with its value and band index.
    pub fn band_series(&self) -> impl Iterator<Item = (NaiveDate, f64, Option<usize>)> + '_ {
        self.series
            .iter()
            .map(|r| (r.date, r.value, self.classifier.classify(Some(r.value))))
    }
}
