//! Type-safe price representation using decimal arithmetic.

use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input could not be parsed as a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative amount in the store currency.
///
/// The catalog service sends plain JSON numbers; the amount is kept as a
/// [`Decimal`] so line totals never accumulate floating point error.
/// Currency and locale formatting belong to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    /// Parse a price from user input such as a form field.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity, e.g. to compute a line total.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::new(Decimal::new(-1, 0)),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Price::parse(" 150000 ").unwrap(), Price::from_units(150_000));
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse("-5"), Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [
            Price::from_units(10_000).times(2),
            Price::from_units(5_000).times(1),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Price::from_units(25_000));
    }

    #[test]
    fn test_deserializes_json_number() {
        let price: Price = serde_json::from_str("199000").unwrap();
        assert_eq!(price, Price::from_units(199_000));
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }

    #[test]
    fn test_display_is_normalized() {
        let price = Price::new(Decimal::new(125_000, 2)).unwrap();
        assert_eq!(price.to_string(), "1250");
    }
}
