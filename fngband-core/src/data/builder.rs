//! Incremental series builder.
//!
//! Turns feed output into a clean `Series`, asking the feed only for the days
//! after a given start date. Acquisition results are memoized per normalized
//! start date in a single-flight cache: concurrent callers for the same key
//! wait on one fetch instead of racing to issue their own.
//!
//! Acquisition never fails loudly. Transport, payload and parse errors are
//! logged and reported upward as "no new data" (`None`).

use super::ingest::ingest;
use super::provider::{DataError, FeedProvider};
use crate::domain::{earliest_supported_date, Series};
use chrono::{Local, NaiveDate};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, info, warn};

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;
type Slot = Arc<OnceLock<Option<Series>>>;

/// Default number of start dates the acquisition memo keeps.
pub const DEFAULT_MEMO_CAPACITY: usize = 128;

/// Memoized acquisition outcomes keyed by normalized start date, evicting
/// the least recently used key once `capacity` is exceeded.
struct AcquisitionCache {
    capacity: usize,
    inner: Mutex<MemoInner>,
}

#[derive(Default)]
struct MemoInner {
    slots: HashMap<NaiveDate, Slot>,
    /// Most recently used key first.
    recency: VecDeque<NaiveDate>,
}

impl AcquisitionCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(MemoInner::default()),
        }
    }

    /// Slot for `key`, created empty on first use. The map lock is held only
    /// while looking up the slot, never while a fetch runs.
    fn slot(&self, key: NaiveDate) -> Slot {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(pos) = inner.recency.iter().position(|k| *k == key) {
            inner.recency.remove(pos);
        }
        inner.recency.push_front(key);

        let slot = Arc::clone(inner.slots.entry(key).or_default());

        while inner.recency.len() > self.capacity {
            if let Some(evicted) = inner.recency.pop_back() {
                inner.slots.remove(&evicted);
                debug!(key = %evicted, "evicted memoized acquisition");
            }
        }
        slot
    }

    fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.slots.clear();
        inner.recency.clear();
    }

    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .slots
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }
}

/// How many days to request from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchHorizon {
    FullHistory,
    Days(usize),
}

impl FetchHorizon {
    /// Horizon for a normalized start date. The earliest supported date
    /// stands for "no start date" and requests the whole history.
    pub fn for_start(start: NaiveDate, today: NaiveDate) -> Self {
        if start <= earliest_supported_date() {
            FetchHorizon::FullHistory
        } else {
            let days = (today - start).num_days().max(0) as usize;
            FetchHorizon::Days(days + 1)
        }
    }

    /// Feed `limit` parameter: 0 means everything.
    pub fn limit(self) -> usize {
        match self {
            FetchHorizon::FullHistory => 0,
            FetchHorizon::Days(n) => n,
        }
    }
}

pub struct IncrementalSeriesBuilder {
    provider: Arc<dyn FeedProvider>,
    today: Clock,
    memo: AcquisitionCache,
}

impl IncrementalSeriesBuilder {
    /// Builder on the local calendar with the default memo capacity.
    pub fn new(provider: Arc<dyn FeedProvider>) -> Self {
        Self {
            provider,
            today: Box::new(|| Local::now().date_naive()),
            memo: AcquisitionCache::new(DEFAULT_MEMO_CAPACITY),
        }
    }

    /// Replace the calendar used to decide what "today" is.
    pub fn with_clock<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = Box::new(today);
        self
    }

    /// Keep at most `capacity` memoized start dates (minimum 1).
    pub fn with_memo_capacity(mut self, capacity: usize) -> Self {
        self.memo = AcquisitionCache::new(capacity);
        self
    }

    /// Build the series of records dated `>= start`.
    ///
    /// Returns `None` when there is nothing new: `start` is today or later,
    /// the feed failed, or every fetched row was filtered out. With `known`
    /// given, only records that `known` does not already hold verbatim are
    /// returned, so merging the result back never duplicates a date.
    ///
    /// A failed acquisition is memoized like a successful one: the same
    /// start date keeps returning `None` until `clear_cache` is called or
    /// the key is evicted.
    pub fn build(&self, start: Option<NaiveDate>, known: Option<&Series>) -> Option<Series> {
        let key = start.unwrap_or_else(earliest_supported_date);
        let today = (self.today)();

        if key >= today {
            debug!(%key, %today, "series already up to date");
            return None;
        }

        let fresh = self
            .memo
            .slot(key)
            .get_or_init(|| self.acquire(key, today))
            .clone()?;

        let result = match known {
            Some(known) => fresh.delta_against(known),
            None => fresh,
        };
        (!result.is_empty()).then_some(result)
    }

    /// Drop every memoized acquisition so the next `build` refetches.
    pub fn clear_cache(&self) {
        self.memo.clear();
    }

    /// Number of start dates with a memoized acquisition outcome.
    pub fn cached_acquisitions(&self) -> usize {
        self.memo.len()
    }

    fn acquire(&self, start: NaiveDate, today: NaiveDate) -> Option<Series> {
        if !self.provider.is_available() {
            warn!(
                provider = self.provider.name(),
                %start,
                "provider unavailable, skipping fetch"
            );
            return None;
        }

        match self.fetch_and_ingest(start, today) {
            Ok(series) if series.is_empty() => {
                info!(%start, "feed returned no usable rows");
                None
            }
            Ok(series) => Some(series),
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    %start,
                    error = %e,
                    "index acquisition failed"
                );
                None
            }
        }
    }

    fn fetch_and_ingest(&self, start: NaiveDate, today: NaiveDate) -> Result<Series, DataError> {
        let horizon = FetchHorizon::for_start(start, today);
        debug!(%start, ?horizon, "fetching index history");

        let rows = self.provider.fetch(horizon.limit())?;
        let (series, report) = ingest(rows, Some(start))?;

        info!(
            provider = self.provider.name(),
            rows = report.rows,
            kept = series.len(),
            "acquired index readings"
        );
        Ok(series)
    }
}
