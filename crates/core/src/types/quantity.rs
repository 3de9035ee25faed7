//! Positive item quantities.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a quantity is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity must be greater than zero (got {0})")]
    NotPositive(i64),
    #[error("quantity {0} exceeds the maximum of {max}", max = Quantity::MAX)]
    TooLarge(i64),
}

/// A strictly positive count of units.
///
/// Bounded by `i32::MAX` so it always fits the `INTEGER` stock column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(u32);

impl Quantity {
    /// Largest accepted quantity.
    pub const MAX: i64 = i32::MAX as i64;

    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity from a signed value.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError` if the value is zero, negative, or larger
    /// than [`Quantity::MAX`].
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value <= 0 {
            return Err(QuantityError::NotPositive(value));
        }
        if value > Self::MAX {
            return Err(QuantityError::TooLarge(value));
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge(value))
    }

    /// Get the quantity as `u32`.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Get the quantity as `i32`, matching the stock column type.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // bounded by MAX on construction
    pub const fn as_i32(self) -> i32 {
        self.0 as i32
    }

    /// Add two quantities, failing if the sum leaves the valid range.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Self::new(i64::from(self.0) + i64::from(other.0)).ok()
    }

    /// Subtract `other`, returning `None` when nothing would remain.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        Self::new(i64::from(self.0) - i64::from(other.0)).ok()
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        Self::from(quantity.0)
    }
}

impl ::core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::new(-3), Err(QuantityError::NotPositive(-3)));
    }

    #[test]
    fn test_rejects_values_beyond_stock_column() {
        assert!(Quantity::new(Quantity::MAX).is_ok());
        assert_eq!(
            Quantity::new(Quantity::MAX + 1),
            Err(QuantityError::TooLarge(Quantity::MAX + 1))
        );
    }

    #[test]
    fn test_checked_sub_stops_at_zero() {
        let three = Quantity::new(3).unwrap();
        let two = Quantity::new(2).unwrap();
        assert_eq!(three.checked_sub(two), Some(Quantity::ONE));
        assert_eq!(two.checked_sub(two), None);
        assert_eq!(two.checked_sub(three), None);
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Quantity::new(Quantity::MAX).unwrap();
        assert_eq!(max.checked_add(Quantity::ONE), None);
    }

    #[test]
    fn test_deserialize_validates() {
        let q: Quantity = serde_json::from_str("4").unwrap();
        assert_eq!(q.get(), 4);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("1.5").is_err());
    }
}
