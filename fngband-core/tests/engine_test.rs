//! End-to-end query behaviour: series → engine → bands.

mod common;

use common::{d, ScriptedFeed};
use fngband_core::data::{CsvSeriesCache, FngDataSource, IncrementalSeriesBuilder};
use fngband_core::{DailyRecord, DateInput, EngineError, IndicatorQueryEngine, Series};
use std::sync::Arc;

fn three_days() -> Series {
    Series::from_records(vec![
        DailyRecord::new(d(2022, 1, 1), 10.0, "Extreme Fear"),
        DailyRecord::new(d(2022, 1, 2), 50.0, "Neutral"),
        DailyRecord::new(d(2022, 1, 3), 90.0, "Extreme Greed"),
    ])
    .unwrap()
}

#[test]
fn bands_for_the_three_day_series() {
    let engine = IndicatorQueryEngine::new(three_days()).unwrap();

    assert_eq!(engine.band_at(Some(d(2022, 1, 1))), Some(0));
    assert_eq!(engine.band_at(Some(d(2022, 1, 2))), Some(2));
    assert_eq!(engine.band_at(Some(d(2022, 1, 3))), Some(4));

    let fear = engine.band_details_at(Some(d(2022, 1, 1))).unwrap();
    assert_eq!(fear.name, "Extreme Fear");
    assert_eq!(fear.multiplier, 1.5);
    assert_eq!(fear.ordinal, "1/5");

    let neutral = engine.band_details_at(Some(d(2022, 1, 2))).unwrap();
    assert_eq!(neutral.name, "Neutral");
    assert_eq!(neutral.multiplier, 1.0);

    let greed = engine.band_details_at(Some(d(2022, 1, 3))).unwrap();
    assert_eq!(greed.name, "Extreme Greed");
    assert_eq!(greed.multiplier, 0.5);
    assert_eq!(greed.ordinal, "5/5");

    assert_eq!(engine.band_details_at(Some(d(2022, 1, 5))), None);
}

#[test]
fn latest_value_without_a_date() {
    let engine = IndicatorQueryEngine::new(three_days()).unwrap();
    assert_eq!(engine.value_at(None), Some(90.0));
    assert_eq!(engine.band_details_at(None).unwrap().name, "Extreme Greed");
}

#[test]
fn missing_date_is_none_not_error() {
    let engine = IndicatorQueryEngine::new(three_days()).unwrap();
    assert_eq!(engine.value_at(Some(d(2023, 6, 1))), None);
    assert_eq!(engine.band_at(Some(d(2023, 6, 1))), None);
}

#[test]
fn empty_series_cannot_build_an_engine() {
    assert!(matches!(
        IndicatorQueryEngine::new(Series::new()),
        Err(EngineError::NoDataAvailable)
    ));
}

#[test]
fn date_inputs_normalize_before_querying() {
    let engine = IndicatorQueryEngine::new(three_days()).unwrap();

    let at = DateInput::from("2022-01-02").to_date().unwrap();
    assert_eq!(engine.value_at(Some(at)), Some(50.0));

    let at = DateInput::from(d(2022, 1, 1).and_hms_opt(23, 59, 0).unwrap())
        .to_date()
        .unwrap();
    assert_eq!(engine.band_at(Some(at)), Some(0));

    assert!(DateInput::from("not a date").to_date().is_err());
}

#[test]
fn engine_from_source_loads_through_the_feed() {
    let dir = tempfile::tempdir().unwrap();
    let feed = Arc::new(ScriptedFeed::daily(d(2022, 1, 1), &["10", "50", "90"]));
    let builder = IncrementalSeriesBuilder::new(feed.clone()).with_clock(|| d(2022, 1, 4));
    let source = FngDataSource::new(builder, CsvSeriesCache::new(dir.path(), "fng_1d_alternative"));

    let engine = IndicatorQueryEngine::from_source(&source, Some(d(2022, 1, 2)), false).unwrap();
    assert_eq!(engine.series().len(), 2);
    assert_eq!(engine.value_at(None), Some(90.0));
    assert_eq!(engine.value_at(Some(d(2022, 1, 1))), None);
}

#[test]
fn engine_from_empty_offline_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let feed = Arc::new(ScriptedFeed::daily(d(2022, 1, 1), &["10"]));
    let builder = IncrementalSeriesBuilder::new(feed.clone());
    let source = FngDataSource::new(builder, CsvSeriesCache::new(dir.path(), "fng_1d_alternative"));

    assert!(matches!(
        IndicatorQueryEngine::from_source(&source, None, true),
        Err(EngineError::NoDataAvailable)
    ));
    assert_eq!(feed.calls(), 0);
}
