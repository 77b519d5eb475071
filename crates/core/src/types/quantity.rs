//! Line-item quantities.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a quantity is out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// Quantities must be at least one.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
}

/// A line-item quantity, always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` if `value` is zero.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            return Err(QuantityError::NotPositive(0));
        }
        Ok(Self(value))
    }

    /// The raw count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .map(Self)
            .ok_or(QuantityError::NotPositive(value))
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(
            Quantity::try_from(-3_i64),
            Err(QuantityError::NotPositive(-3))
        );
    }

    #[test]
    fn test_positive_is_accepted() {
        assert_eq!(Quantity::new(4).unwrap().get(), 4);
        assert_eq!(Quantity::default(), Quantity::ONE);
    }

    #[test]
    fn test_deserialize_validates() {
        let q: Quantity = serde_json::from_str("2").unwrap();
        assert_eq!(q.get(), 2);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }
}
