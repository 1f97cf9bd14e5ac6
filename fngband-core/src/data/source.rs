//! Cache-then-feed loading for the index series.
//!
//! Resolution policy:
//! 1. Load whatever the cache holds.
//! 2. Unless offline, ask the builder for everything from the cache's last
//!    date onward (the full history when nothing is cached).
//! 3. Merge new records into the cached series and save when anything changed.
//! 4. A failed acquisition leaves the cached series as the answer.

use super::builder::IncrementalSeriesBuilder;
use super::cache::SeriesCache;
use super::provider::DataError;
use crate::domain::Series;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Where a loaded series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOrigin {
    /// Cache only; nothing new was acquired.
    Cache,
    /// Cache merged with freshly acquired records.
    Refreshed { new_records: usize },
    /// Nothing was cached; the series came entirely from the feed.
    Feed,
    /// Neither cache nor feed produced data.
    Empty,
}

#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: Series,
    pub origin: SeriesOrigin,
}

pub struct FngDataSource<C: SeriesCache> {
    builder: IncrementalSeriesBuilder,
    cache: C,
}

impl<C: SeriesCache> FngDataSource<C> {
    /// Source that refreshes `cache` through `builder`.
    pub fn new(builder: IncrementalSeriesBuilder, cache: C) -> Self {
        Self { builder, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn builder(&self) -> &IncrementalSeriesBuilder {
        &self.builder
    }

    /// Load the cached series and, unless `offline`, reconcile it with new feed data.
    ///
    /// Only a failed cache write is an error; acquisition problems degrade to
    /// the cached data.
    pub fn load(&self, offline: bool) -> Result<LoadedSeries, DataError> {
        let cached = match self.cache.load() {
            Ok(cached) => cached,
            Err(e) => {
                warn!(key = self.cache.key(), error = %e, "cache unreadable, ignoring");
                None
            }
        };

        if offline {
            return Ok(match cached {
                Some(series) => LoadedSeries {
                    series,
                    origin: SeriesOrigin::Cache,
                },
                None => LoadedSeries {
                    series: Series::new(),
                    origin: SeriesOrigin::Empty,
                },
            });
        }

        let start = cached.as_ref().and_then(Series::last_date);
        let fresh = self.builder.build(start, cached.as_ref());

        let loaded = match (cached, fresh) {
            (Some(series), None) => LoadedSeries {
                series,
                origin: SeriesOrigin::Cache,
            },
            (Some(series), Some(delta)) => {
                let merged = series.merged_with(&delta);
                self.cache.save(&merged)?;
                info!(
                    key = self.cache.key(),
                    new_records = delta.len(),
                    total = merged.len(),
                    "cache refreshed"
                );
                LoadedSeries {
                    series: merged,
                    origin: SeriesOrigin::Refreshed {
                        new_records: delta.len(),
                    },
                }
            }
            (None, Some(series)) => {
                self.cache.save(&series)?;
                info!(key = self.cache.key(), total = series.len(), "cache created");
                LoadedSeries {
                    series,
                    origin: SeriesOrigin::Feed,
                }
            }
            (None, None) => LoadedSeries {
                series: Series::new(),
                origin: SeriesOrigin::Empty,
            },
        };

        Ok(loaded)
    }

    /// Loaded series restricted to dates `>= start`.
    pub fn series_from(&self, start: Option<NaiveDate>, offline: bool) -> Result<Series, DataError> {
        let loaded = self.load(offline)?;
        Ok(match start {
            Some(start) => loaded.series.range_from(start),
            None => loaded.series,
        })
    }
}
