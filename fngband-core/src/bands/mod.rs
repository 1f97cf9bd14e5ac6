//! Sentiment bands: the fixed five-band table and the classifier over it.

pub mod classifier;
pub mod table;

pub use classifier::{BandClassifier, BandDetails};
pub use table::{Band, Bound, BAND_COUNT, FNG_BANDS};
