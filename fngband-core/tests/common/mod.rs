//! Shared fixtures: a scripted in-memory feed and date helpers.

#![allow(dead_code)]

use chrono::{Local, NaiveDate, TimeZone};
use fngband_core::data::{DataError, FeedProvider, RawFeedRecord};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Epoch seconds for local noon on `date`, so the local calendar date
/// round-trips regardless of the test machine's time zone.
pub fn noon_ts(date: NaiveDate) -> i64 {
    let noon = date.and_hms_opt(12, 0, 0).unwrap();
    Local.from_local_datetime(&noon).single().unwrap().timestamp()
}

pub fn row(date: NaiveDate, value: &str, label: &str) -> RawFeedRecord {
    RawFeedRecord::new(noon_ts(date).to_string().as_str(), value, label)
}

/// Feed that serves a fixed list of rows, newest first, and records every call.
pub struct ScriptedFeed {
    rows: Mutex<Vec<RawFeedRecord>>,
    calls: AtomicUsize,
    limits: Mutex<Vec<usize>>,
    failing: AtomicBool,
    available: AtomicBool,
    latency: Duration,
}

impl ScriptedFeed {
    /// `rows` may be given in any order; they are served newest first.
    pub fn new(mut rows: Vec<RawFeedRecord>) -> Self {
        rows.sort_by_key(|r| std::cmp::Reverse(r.timestamp.as_i64()));
        Self {
            rows: Mutex::new(rows),
            calls: AtomicUsize::new(0),
            limits: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            available: AtomicBool::new(true),
            latency: Duration::ZERO,
        }
    }

    /// One row per day from `start`, values from `values`.
    pub fn daily(start: NaiveDate, values: &[&str]) -> Self {
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, v)| row(start + chrono::Duration::days(i as i64), v, ""))
            .collect();
        Self::new(rows)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// What `is_available` reports; fetches still work either way.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn push(&self, record: RawFeedRecord) {
        let mut rows = self.rows.lock().unwrap();
        rows.push(record);
        rows.sort_by_key(|r| std::cmp::Reverse(r.timestamp.as_i64()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn limits(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }
}

impl FeedProvider for ScriptedFeed {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(&self, limit: usize) -> Result<Vec<RawFeedRecord>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.limits.lock().unwrap().push(limit);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DataError::NetworkUnreachable("scripted outage".into()));
        }
        let rows = self.rows.lock().unwrap();
        let take = if limit == 0 { rows.len() } else { limit.min(rows.len()) };
        Ok(rows[..take].to_vec())
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
