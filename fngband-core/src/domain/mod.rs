//! Domain types: daily records, the date-indexed series, date normalization.

pub mod date;
pub mod record;
pub mod series;

pub use date::{earliest_supported_date, parse_any_date, timestamp_to_local_date, DateInput, DateParseError};
pub use record::DailyRecord;
pub use series::{Series, SeriesError};
