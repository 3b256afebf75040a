//! Mean score type backed by rust_decimal.
//!
//! Averages are computed from exact integer totals and rounded to two decimal
//! places, half away from zero, so they agree with SQL `ROUND(AVG(x), 2)`.

use rust_decimal::RoundingStrategy;
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places kept by an [`Average`].
pub const AVERAGE_SCALE: u32 = 2;

/// A mean score rounded to two decimal places.
///
/// Serializes to a JSON number (not string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Average(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Average {
    /// Round an exact value to an average.
    pub fn new(exact: RustDecimal) -> Self {
        Average(exact.round_dp_with_strategy(AVERAGE_SCALE, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Mean of `count` scores summing to `total`, or `None` when there are no scores.
    pub fn from_totals(total: i64, count: i64) -> Option<Self> {
        exact_mean(total, count).map(Average::new)
    }

    /// Parse an average from a string, rounding to two places.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Average::new)
    }

    /// Format with exactly two decimal places, e.g. `"91.00"`.
    pub fn to_fixed_string(&self) -> String {
        format!("{:.2}", self.0)
    }
}

/// Unrounded mean of `count` scores summing to `total`.
pub fn exact_mean(total: i64, count: i64) -> Option<RustDecimal> {
    if count <= 0 {
        return None;
    }
    Some(RustDecimal::from(total) / RustDecimal::from(count))
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed_string())
    }
}

impl FromStr for Average {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}
