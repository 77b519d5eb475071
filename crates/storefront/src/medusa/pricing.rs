//! Price extraction from variant payloads.
//!
//! Depending on backend version and on whether a region was supplied, a
//! variant carries its price in one of several shapes. Extraction tries them
//! in a fixed order and the first match wins:
//!
//! 1. A calculated price set: its calculated amount, else its original
//!    amount, tagged with its currency or the default currency.
//! 2. The first entry of the direct `prices` list.
//! 3. A flat `calculated_price` scalar, else `original_price`, tagged with
//!    the default currency.
//!
//! No match means "no price available", which is not an error.

use pps_core::{CurrencyCode, Price};

use super::types::{CalculatedPrice, CalculatedPriceSet, Product, ProductVariant};

/// Extract the display price of a variant.
#[must_use]
pub fn extract_price(variant: &ProductVariant) -> Option<Price> {
    from_price_set(variant)
        .or_else(|| from_price_list(variant))
        .or_else(|| from_scalar(variant))
}

/// Lowest extracted price across a product's variants.
///
/// Only prices in the currency of the first priced variant are compared.
#[must_use]
pub fn lowest_price(product: &Product) -> Option<Price> {
    let mut prices = product.variants.iter().filter_map(extract_price);
    let first = prices.next()?;
    let currency = first.currency_code.clone();
    Some(
        prices
            .filter(|price| price.currency_code == currency)
            .fold(first, |lowest, price| {
                if price.amount < lowest.amount {
                    price
                } else {
                    lowest
                }
            }),
    )
}

/// One human-readable line per variant describing its extracted price.
#[must_use]
pub fn price_report(product: &Product) -> Vec<String> {
    product
        .variants
        .iter()
        .map(|variant| {
            let label = variant
                .title
                .as_deref()
                .or_else(|| variant.id.as_ref().map(pps_core::VariantId::as_str))
                .unwrap_or("(untitled variant)");
            extract_price(variant).map_or_else(
                || format!("{label}: no price available"),
                |price| format!("{label}: {price}"),
            )
        })
        .collect()
}

fn from_price_set(variant: &ProductVariant) -> Option<Price> {
    let set = variant
        .calculated_price_set
        .as_ref()
        .or(match &variant.calculated_price {
            Some(CalculatedPrice::Set(set)) => Some(set),
            _ => None,
        })?;
    set_amount(set, None)
}

fn set_amount(set: &CalculatedPriceSet, outer_currency: Option<&str>) -> Option<Price> {
    let currency = set.currency_code.as_deref().or(outer_currency);

    if let Some(amount) = set.calculated_amount.or(set.original_amount) {
        return Some(Price::new(amount, currency.map_or_else(CurrencyCode::default, CurrencyCode::new)));
    }

    set.amount
        .as_deref()
        .and_then(|nested| set_amount(nested, currency))
}

fn from_price_list(variant: &ProductVariant) -> Option<Price> {
    let first = variant.prices.first()?;
    Some(Price::new(
        first.amount,
        first
            .currency_code
            .as_deref()
            .map_or_else(CurrencyCode::default, CurrencyCode::new),
    ))
}

fn from_scalar(variant: &ProductVariant) -> Option<Price> {
    let scalar = match &variant.calculated_price {
        Some(CalculatedPrice::Amount(amount)) => Some(*amount),
        _ => None,
    };
    scalar
        .or(variant.original_price)
        .map(Price::with_default_currency)
}
