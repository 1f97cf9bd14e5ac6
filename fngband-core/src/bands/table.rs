//! Static band table for the Fear & Greed index.
//!
//! Interval edges are not uniform: the middle band is closed on both sides,
//! the lower bands are half-open on the right and the upper bands half-open
//! on the left. Each of 25, 46, 54 and 75 belongs to exactly one band.

use serde::Serialize;

pub const BAND_COUNT: usize = 5;

/// One edge of a band interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

impl Bound {
    pub const fn closed(value: f64) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub const fn open(value: f64) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

/// A sentiment band. `color` is an opaque display token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub index: usize,
    pub name: &'static str,
    pub color: &'static str,
    pub multiplier: f64,
    pub lower: Bound,
    pub upper: Bound,
}

impl Band {
    /// Whether `value` falls inside this band, honoring edge inclusivity.
    pub fn contains(&self, value: f64) -> bool {
        let above_lower = if self.lower.inclusive {
            value >= self.lower.value
        } else {
            value > self.lower.value
        };
        let below_upper = if self.upper.inclusive {
            value <= self.upper.value
        } else {
            value < self.upper.value
        };
        above_lower && below_upper
    }

    /// 1-based position in a table of `band_count` bands, e.g. `"3/5"`.
    pub fn ordinal(&self, band_count: usize) -> String {
        format!("{}/{}", self.index + 1, band_count)
    }
}

pub static FNG_BANDS: [Band; BAND_COUNT] = [
    Band {
        index: 0,
        name: "Extreme Fear",
        color: "#C05840",
        multiplier: 1.5,
        lower: Bound::closed(0.0),
        upper: Bound::open(25.0),
    },
    Band {
        index: 1,
        name: "Fear",
        color: "#FC9A24",
        multiplier: 1.25,
        lower: Bound::closed(25.0),
        upper: Bound::open(46.0),
    },
    Band {
        index: 2,
        name: "Neutral",
        color: "#E5C769",
        multiplier: 1.0,
        lower: Bound::closed(46.0),
        upper: Bound::closed(54.0),
    },
    Band {
        index: 3,
        name: "Greed",
        color: "#B4E168",
        multiplier: 0.75,
        lower: Bound::open(54.0),
        upper: Bound::closed(75.0),
    },
    Band {
        index: 4,
        name: "Extreme Greed",
        color: "#5CBC3C",
        multiplier: 0.5,
        lower: Bound::open(75.0),
        upper: Bound::closed(100.0),
    },
];
