//! Zero-division-safe rates and averages.

use serde::{Serialize, Serializer};

/// A quotient that may have no defined value.
///
/// `Undefined` means the denominator was zero ("no data"), which is
/// distinct from a computed `Defined(0.0)`. It serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    /// `numerator / denominator`, undefined when the denominator is zero.
    pub fn of(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            Ratio::Undefined
        } else {
            Ratio::Defined(numerator as f64 / denominator as f64)
        }
    }

    /// `numerator / denominator * 100`, undefined when the denominator is zero.
    pub fn percent(numerator: u64, denominator: u64) -> Self {
        match Self::of(numerator, denominator) {
            Ratio::Defined(v) => Ratio::Defined(v * 100.0),
            Ratio::Undefined => Ratio::Undefined,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Ratio::Defined(_))
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ratio::Defined(v) => serializer.serialize_f64(*v),
            Ratio::Undefined => serializer.serialize_none(),
        }
    }
}
