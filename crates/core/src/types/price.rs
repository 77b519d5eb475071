//! Type-safe price representation using decimal arithmetic.
//!
//! Medusa reports amounts as JSON numbers together with a lower-case ISO 4217
//! currency code (`"usd"`, `"eur"`). Prices are kept in that shape: the amount
//! exactly as the backend reported it and the code normalized to lower case.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount as reported by the backend.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(rename = "currency")]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price tagged with the default currency.
    #[must_use]
    pub fn with_default_currency(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::default())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.amount.normalize(),
            self.currency_code.as_str().to_uppercase()
        )
    }
}

/// ISO 4217 currency code, normalized to lower case.
///
/// Stored as a string because the backend may be configured with any
/// currency, not only a fixed list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Currency assumed when the backend omits one.
    pub const DEFAULT: &'static str = "usd";

    /// Create a currency code, normalizing case and whitespace.
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_lowercase())
    }

    /// The lower-case code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        Self::new(&code)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_normalizes_case() {
        assert_eq!(CurrencyCode::new(" USD ").as_str(), "usd");
        assert_eq!(CurrencyCode::from("Eur"), CurrencyCode::new("eur"));
    }

    #[test]
    fn test_default_currency_is_usd() {
        let price = Price::with_default_currency(Decimal::from(1999));
        assert_eq!(price.currency_code.as_str(), "usd");
    }

    #[test]
    fn test_price_serializes_with_currency_field() {
        let price = Price::new(Decimal::from(500), CurrencyCode::new("EUR"));
        let json = serde_json::to_value(&price).unwrap();
        assert_eq!(json["currency"], "eur");

        let back: Price = serde_json::from_value(json).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_price_display() {
        let price = Price::new(Decimal::new(1999, 2), CurrencyCode::new("usd"));
        assert_eq!(price.to_string(), "19.99 USD");
    }
}
