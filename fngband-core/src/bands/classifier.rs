//! Value → band mapping and band metadata lookup.

use super::table::{Band, FNG_BANDS};
use serde::Serialize;

/// Full description of a band, ready for display or strategy weighting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandDetails {
    pub index: usize,
    /// `"<index+1>/<band count>"`
    pub ordinal: String,
    pub name: &'static str,
    pub color: &'static str,
    pub multiplier: f64,
}

impl BandDetails {
    /// Details for `band` within a table of `band_count` bands.
    pub fn new(band: &Band, band_count: usize) -> Self {
        Self {
            index: band.index,
            ordinal: band.ordinal(band_count),
            name: band.name,
            color: band.color,
            multiplier: band.multiplier,
        }
    }
}

/// Stateless classifier over a static band table.
#[derive(Debug, Clone, Copy)]
pub struct BandClassifier {
    bands: &'static [Band],
}

impl Default for BandClassifier {
    fn default() -> Self {
        Self { bands: &FNG_BANDS }
    }
}

impl BandClassifier {
    /// Classifier over a custom table. Bands must be listed in index order.
    pub fn new(bands: &'static [Band]) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &'static [Band] {
        self.bands
    }

    /// Band index for a value, or `None` if the value is missing, NaN, or
    /// outside every band.
    pub fn classify(&self, value: Option<f64>) -> Option<usize> {
        let value = value?;
        self.bands
            .iter()
            .find(|band| band.contains(value))
            .map(|band| band.index)
    }

    /// Metadata for a band index. Accepts signed indices so that caller
    /// arithmetic gone negative comes back as `None` rather than a panic.
    pub fn describe<I: TryInto<usize>>(&self, index: I) -> Option<BandDetails> {
        let index = index.try_into().ok()?;
        self.bands
            .get(index)
            .map(|band| BandDetails::new(band, self.bands.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::table::Bound;

    #[test]
    fn pinned_boundaries() {
        let c = BandClassifier::default();
        let cases = [
            (0.0, 0),
            (24.999, 0),
            (25.0, 1),
            (45.999, 1),
            (46.0, 2),
            (54.0, 2),
            (54.001, 3),
            (75.0, 3),
            (75.001, 4),
            (100.0, 4),
        ];
        for (value, expected) in cases {
            assert_eq!(c.classify(Some(value)), Some(expected), "value {value}");
        }
    }

    #[test]
    fn fails_closed_outside_range() {
        let c = BandClassifier::default();
        assert_eq!(c.classify(Some(-1.0)), None);
        assert_eq!(c.classify(Some(101.0)), None);
        assert_eq!(c.classify(Some(100.0001)), None);
        assert_eq!(c.classify(Some(f64::NAN)), None);
        assert_eq!(c.classify(None), None);
    }

    #[test]
    fn describe_follows_table_order() {
        let c = BandClassifier::default();
        let expected = [
            ("Extreme Fear", "#C05840", 1.5),
            ("Fear", "#FC9A24", 1.25),
            ("Neutral", "#E5C769", 1.0),
            ("Greed", "#B4E168", 0.75),
            ("Extreme Greed", "#5CBC3C", 0.5),
        ];
        for (i, (name, color, multiplier)) in expected.into_iter().enumerate() {
            let details = c.describe(i).unwrap();
            assert_eq!(details.index, i);
            assert_eq!(details.ordinal, format!("{}/5", i + 1));
            assert_eq!(details.name, name);
            assert_eq!(details.color, color);
            assert_eq!(details.multiplier, multiplier);
        }
    }

    static THREE_BANDS: [Band; 3] = [
        Band {
            index: 0,
            name: "Low",
            color: "red",
            multiplier: 1.0,
            lower: Bound::closed(0.0),
            upper: Bound::open(50.0),
        },
        Band {
            index: 1,
            name: "Mid",
            color: "grey",
            multiplier: 1.0,
            lower: Bound::closed(50.0),
            upper: Bound::closed(50.0),
        },
        Band {
            index: 2,
            name: "High",
            color: "green",
            multiplier: 1.0,
            lower: Bound::open(50.0),
            upper: Bound::closed(100.0),
        },
    ];

    #[test]
    fn custom_table_ordinal_uses_its_own_length() {
        let c = BandClassifier::new(&THREE_BANDS);
        assert_eq!(c.classify(Some(50.0)), Some(1));
        assert_eq!(c.describe(2).unwrap().ordinal, "3/3");
        assert_eq!(c.describe(3), None);
    }

    #[test]
    fn describe_rejects_bad_indices() {
        let c = BandClassifier::default();
        assert_eq!(c.describe(5), None);
        assert_eq!(c.describe(-1), None);
        assert_eq!(c.describe(usize::MAX), None);
    }
}
