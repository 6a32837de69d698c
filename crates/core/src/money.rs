//! Monetary amounts.
//!
//! Amounts are Kuwaiti dinar with three decimal places (fils). Arithmetic is
//! done in `f64` and equality between computed totals always goes through a
//! tolerance check (`AMOUNT_TOLERANCE`), never `==`.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Absolute tolerance used when comparing summed amounts (one fils).
pub const AMOUNT_TOLERANCE: f64 = 0.001;

/// Non-negative, finite monetary amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    pub fn new(value: f64) -> DomainResult<Self> {
        if !value.is_finite() {
            return Err(DomainError::validation("amount must be a finite number"));
        }
        if value < 0.0 {
            return Err(DomainError::validation(format!(
                "amount must not be negative (got {value})"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.abs() < AMOUNT_TOLERANCE
    }

    /// `|self - other| <= tolerance`, compared in whole fils so that float
    /// noise on either side of the boundary cannot flip the result.
    pub fn approx_eq(self, other: Amount, tolerance: f64) -> bool {
        let fils = |v: f64| (v * 1000.0).round();
        (fils(self.0) - fils(other.0)).abs() <= fils(tolerance)
    }

    /// Signed difference `self - other` (may be negative, e.g. a loss).
    pub fn difference(self, other: Amount) -> f64 {
        self.0 - other.0
    }

    /// Apply a percentage markup: `self * (1 + percent / 100)`, rounded to fils.
    pub fn with_markup(self, percent: f64) -> DomainResult<Self> {
        Self::new(self.0 * (1.0 + percent / 100.0)).map(Self::rounded)
    }

    /// Round to three decimal places.
    pub fn rounded(self) -> Self {
        Self((self.0 * 1000.0).round() / 1000.0)
    }
}

impl TryFrom<f64> for Amount {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for f64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl core::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl core::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl<'a> core::iter::Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn amt(v: f64) -> Amount {
        Amount::new(v).unwrap()
    }

    #[test]
    fn negative_and_non_finite_are_rejected() {
        assert!(Amount::new(-0.5).is_err());
        assert!(Amount::new(f64::NAN).is_err());
        assert!(Amount::new(f64::INFINITY).is_err());
    }

    #[test]
    fn one_fils_apart_is_within_tolerance() {
        assert!(amt(100.001).approx_eq(amt(100.0), AMOUNT_TOLERANCE));
        assert!(amt(0.3).approx_eq(amt(0.1) + amt(0.2), AMOUNT_TOLERANCE));
        assert!(amt(99.999).approx_eq(amt(100.0), AMOUNT_TOLERANCE));
        assert!(!amt(100.002).approx_eq(amt(100.0), AMOUNT_TOLERANCE));
    }

    #[test]
    fn deserialize_enforces_non_negative() {
        assert!(serde_json::from_value::<Amount>(json!(-1.0)).is_err());
        assert_eq!(serde_json::from_value::<Amount>(json!(12.25)).unwrap(), amt(12.25));
    }

    #[test]
    fn markup_rounds_to_fils() {
        assert_eq!(amt(100.0).with_markup(15.0).unwrap(), amt(115.0));
        assert_eq!(amt(33.333).with_markup(10.0).unwrap(), amt(36.666));
    }

    #[test]
    fn display_uses_three_decimals() {
        assert_eq!(amt(150.0).to_string(), "150.000");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: summing split parts of a total stays within tolerance of it.
        #[test]
        fn split_parts_sum_back_within_tolerance(
            fils in 0u64..10_000_000u64,
            first_share in 0u64..1000u64,
        ) {
            let total = fils as f64 / 1000.0;
            let first = ((total * first_share as f64 / 1000.0) * 1000.0).round() / 1000.0;
            let second = total - first;
            prop_assume!(second >= 0.0);
            let sum: Amount = [amt(first), amt(second)].iter().sum();
            prop_assert!(sum.approx_eq(amt(total), AMOUNT_TOLERANCE));
        }
    }
}
