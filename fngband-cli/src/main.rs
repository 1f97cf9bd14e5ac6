//! fngband CLI: refresh, query and cache management commands.
//!
//! Commands:
//! - `refresh`: incrementally update the cached index series from alternative.me
//! - `show`: value and band at a date (latest by default)
//! - `history`: per-day value, band and feed label over a date range
//! - `cache status`: report cache key, date range and record count

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fngband_core::data::{
    AlternativeMeProvider, CsvSeriesCache, FngDataSource, IncrementalSeriesBuilder, SeriesOrigin,
};
use fngband_core::{DateInput, FngConfig, IndicatorQueryEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fngband",
    about = "fngband: Fear & Greed index cache and sentiment bands"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache directory (overrides the config file).
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch new index readings and merge them into the cache.
    Refresh,
    /// Show the index value and band at a date.
    Show {
        /// Date (YYYY-MM-DD, RFC 3339 or epoch seconds). Defaults to the latest date.
        #[arg(long)]
        date: Option<String>,

        /// Use cached data only.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Print JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print value, band and feed label for each day in a range.
    History {
        /// First date to print. Defaults to 30 days before the latest date.
        #[arg(long)]
        start: Option<String>,

        /// Last date to print. Defaults to the latest date.
        #[arg(long)]
        end: Option<String>,

        /// Use cached data only.
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cache key, date range and record count.
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fngband_core=info,fngband_cli=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref(), cli.cache_dir)?;

    match cli.command {
        Commands::Refresh => run_refresh(&config),
        Commands::Show {
            date,
            offline,
            json,
        } => run_show(&config, date.as_deref(), offline, json),
        Commands::History {
            start,
            end,
            offline,
        } => run_history(&config, start.as_deref(), end.as_deref(), offline),
        Commands::Cache { action } => match action {
            CacheAction::Status => run_cache_status(&config),
        },
    }
}

fn load_config(path: Option<&PathBuf>, cache_dir: Option<PathBuf>) -> Result<FngConfig> {
    let mut config = match path {
        Some(path) => FngConfig::from_file(path)?,
        None => FngConfig::default(),
    };
    if let Some(dir) = cache_dir {
        config.cache.dir = dir;
    }
    Ok(config)
}

fn build_source(config: &FngConfig) -> Result<FngDataSource<CsvSeriesCache>> {
    let provider = AlternativeMeProvider::from_config(&config.feed)?;
    let builder = IncrementalSeriesBuilder::new(Arc::new(provider));
    let cache = CsvSeriesCache::new(&config.cache.dir, config.cache.key());
    Ok(FngDataSource::new(builder, cache))
}

fn parse_date_arg(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            DateInput::from(s)
                .to_date()
                .with_context(|| format!("invalid --{flag}"))
        })
        .transpose()
}

fn run_refresh(config: &FngConfig) -> Result<()> {
    let source = build_source(config)?;
    let loaded = source.load(false)?;

    match loaded.origin {
        SeriesOrigin::Empty => bail!("no index data available: feed unreachable and cache empty"),
        SeriesOrigin::Cache => println!("Cache already up to date."),
        SeriesOrigin::Refreshed { new_records } => println!("Added {new_records} new record(s)."),
        SeriesOrigin::Feed => println!("Cache created from full feed history."),
    }

    if let (Some(first), Some(last)) = (loaded.series.first_date(), loaded.series.last_date()) {
        println!(
            "{}: {} records, {first} to {last}",
            source.cache().data_path().display(),
            loaded.series.len()
        );
    }
    Ok(())
}

fn run_show(config: &FngConfig, date: Option<&str>, offline: bool, json: bool) -> Result<()> {
    let at = parse_date_arg("date", date)?;
    let source = build_source(config)?;
    let engine = IndicatorQueryEngine::from_source(&source, config.engine.start_date, offline)?;

    let day = engine.resolve_date(at)?;
    let value = engine.value_on(Some(day))?;
    let details = engine.band_details_on(Some(day))?;

    if json {
        let out = serde_json::json!({
            "date": day.to_string(),
            "value": value,
            "band": details,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match (value, details) {
        (Some(value), Some(band)) => {
            println!("Date:       {day}");
            println!("Value:      {value}");
            println!("Band:       {} ({})", band.name, band.ordinal);
            println!("Color:      {}", band.color);
            println!("Multiplier: {}", band.multiplier);
        }
        _ => println!("No index data at {day} (latest is {}).", engine.latest_date()),
    }
    Ok(())
}

fn run_history(
    config: &FngConfig,
    start: Option<&str>,
    end: Option<&str>,
    offline: bool,
) -> Result<()> {
    let start = parse_date_arg("start", start)?;
    let end = parse_date_arg("end", end)?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            bail!("--start {s} is after --end {e}");
        }
    }

    let source = build_source(config)?;
    let engine = IndicatorQueryEngine::from_source(&source, config.engine.start_date, offline)?;
    let start = start.unwrap_or_else(|| engine.latest_date() - chrono::Duration::days(30));
    let window = engine.series().range(Some(start), end);

    if window.is_empty() {
        let end = end.map_or_else(|| "latest".to_string(), |e| e.to_string());
        println!("No index data between {start} and {end}.");
        return Ok(());
    }

    let classifier = engine.classifier();
    println!(
        "{:<12} {:>6}  {:<14} {:<5} {:<14}",
        "Date", "Value", "Band", "Pos", "Feed label"
    );
    println!("{}", "-".repeat(56));
    for record in &window {
        let band = classifier
            .classify(Some(record.value))
            .and_then(|i| classifier.describe(i));
        let (name, ordinal) = band
            .map(|b| (b.name, b.ordinal))
            .unwrap_or(("-", "-".to_string()));
        println!(
            "{:<12} {:>6}  {:<14} {:<5} {:<14}",
            record.date.to_string(),
            record.value,
            name,
            ordinal,
            record.label
        );
    }
    Ok(())
}

fn run_cache_status(config: &FngConfig) -> Result<()> {
    let cache = CsvSeriesCache::new(&config.cache.dir, config.cache.key());
    let status = cache.status();

    println!("Cache: {}", cache.data_path().display());
    if !status.cached {
        println!("Not cached: run `fngband refresh` first.");
        return Ok(());
    }

    if let (Some(start), Some(end)) = (status.start_date, status.end_date) {
        println!("Date range: {start} to {end}");
    }
    if let Some(count) = status.record_count {
        println!("Records:    {count}");
    }
    if let Some(meta) = cache.get_meta() {
        println!("Cached at:  {}", meta.cached_at.format("%Y-%m-%d %H:%M:%S"));
        println!("Hash:       {}", meta.data_hash);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fngband",
            "show",
            "--date",
            "2022-01-03",
            "--cache-dir",
            "/tmp/fng",
        ])
        .unwrap();
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/fng")));
        assert!(matches!(cli.command, Commands::Show { date: Some(_), .. }));
    }

    #[test]
    fn cache_dir_flag_overrides_config() {
        let config = load_config(None, Some(PathBuf::from("elsewhere"))).unwrap();
        assert_eq!(config.cache.dir, PathBuf::from("elsewhere"));
        assert_eq!(config.cache.key(), "fng_1d_alternative");
    }

    #[test]
    fn bad_date_flag_is_reported() {
        let err = parse_date_arg("date", Some("someday")).unwrap_err();
        assert!(err.to_string().contains("--date"));
        assert_eq!(parse_date_arg("date", None).unwrap(), None);
    }

    #[test]
    fn date_flag_accepts_every_text_form() {
        let expected = NaiveDate::from_ymd_opt(2022, 1, 3);
        assert_eq!(parse_date_arg("date", Some("2022-01-03")).unwrap(), expected);
        assert_eq!(parse_date_arg("date", Some("2022/01/03")).unwrap(), expected);
        assert_eq!(
            parse_date_arg("date", Some("2022-01-03T09:30:00+00:00")).unwrap(),
            expected
        );
    }
}
