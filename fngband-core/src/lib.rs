//! fngband core: Fear & Greed index acquisition, caching and band classification.
//!
//! This crate contains:
//! - Domain types (daily records, the date-indexed series, date normalization)
//! - The fixed five-band table and the classifier over it
//! - Feed provider trait and the alternative.me provider
//! - Incremental series builder with a single-flight acquisition cache
//! - CSV series cache and the cache-then-feed data source
//! - The date-scoped query engine

pub mod bands;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;

pub use bands::{BandClassifier, BandDetails, BAND_COUNT, FNG_BANDS};
pub use config::{ConfigError, FngConfig};
pub use data::{
    AlternativeMeProvider, CsvSeriesCache, DataError, FeedProvider, FngDataSource,
    IncrementalSeriesBuilder, SeriesCache,
};
pub use domain::{parse_any_date, DailyRecord, DateInput, DateParseError, Series};
pub use engine::{EngineError, IndicatorQueryEngine};
