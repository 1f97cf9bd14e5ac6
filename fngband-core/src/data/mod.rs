//! Data acquisition, ingestion and caching

pub mod alternative;
pub mod builder;
pub mod cache;
pub mod circuit_breaker;
pub mod ingest;
pub mod provider;
pub mod source;

pub use alternative::AlternativeMeProvider;
pub use builder::{FetchHorizon, IncrementalSeriesBuilder, DEFAULT_MEMO_CAPACITY};
pub use cache::{CacheMeta, CacheStatus, CsvSeriesCache, SeriesCache};
pub use circuit_breaker::CircuitBreaker;
pub use ingest::{ingest, IngestReport};
pub use provider::{DataError, FeedProvider, FeedScalar, RawFeedRecord};
pub use source::{FngDataSource, LoadedSeries, SeriesOrigin};
