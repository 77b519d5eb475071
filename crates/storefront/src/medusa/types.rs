//! Domain types for the Medusa store API.
//!
//! These mirror the JSON payloads closely enough to round-trip through
//! durable storage. Fields the storefront never reads are dropped on
//! deserialization.

use pps_core::{CartId, CollectionId, LineItemId, ProductId, RegionId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Price Types
// =============================================================================

/// An amount and its currency, as found in a variant's `prices` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyAmount {
    /// Amount as reported by the backend.
    pub amount: Decimal,
    /// Lower-case ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// A calculated price set attached to a variant when a region is known.
///
/// Medusa has shipped this both flat
/// (`{calculated_amount, original_amount, currency_code}`) and with the
/// amounts nested one level down under `amount`; both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedPriceSet {
    /// Price after price lists and promotions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_amount: Option<Decimal>,
    /// Price before price lists and promotions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<Decimal>,
    /// Currency of both amounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    /// Nested amounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Box<CalculatedPriceSet>>,
}

/// The `calculated_price` field: either a full set or a bare scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalculatedPrice {
    /// Bare amount in the region's currency.
    Amount(Decimal),
    /// Nested calculated price set.
    Set(CalculatedPriceSet),
}

// =============================================================================
// Product Types
// =============================================================================

/// A purchasable configuration of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID (pass to cart).
    #[serde(default)]
    pub id: Option<VariantId>,
    /// Display title (e.g. "Large / Blue").
    #[serde(default)]
    pub title: Option<String>,
    /// Stock keeping unit.
    #[serde(default)]
    pub sku: Option<String>,
    /// Direct prices, one per currency.
    #[serde(default, deserialize_with = "null_as_default")]
    pub prices: Vec<MoneyAmount>,
    /// Region-aware price, set or scalar.
    #[serde(default)]
    pub calculated_price: Option<CalculatedPrice>,
    /// Region-aware price set under its long name.
    #[serde(default)]
    pub calculated_price_set: Option<CalculatedPriceSet>,
    /// Undiscounted scalar price.
    #[serde(default)]
    pub original_price: Option<Decimal>,
}

/// Reference to the collection a product belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    pub id: CollectionId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// URL handle.
    #[serde(default)]
    pub handle: Option<String>,
}

/// A product as returned by the listing endpoint.
///
/// The identifier is optional because the cache must tolerate (and skip)
/// records without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    #[serde(default)]
    pub id: Option<ProductId>,
    /// Product title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// URL handle.
    #[serde(default)]
    pub handle: Option<String>,
    /// Plain-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Thumbnail image URL.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Owning collection, when expanded.
    #[serde(default)]
    pub collection: Option<Collection>,
    /// Owning collection ID.
    #[serde(default)]
    pub collection_id: Option<CollectionId>,
    /// Variants in display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Find a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|v| v.id.as_ref().is_some_and(|vid| vid == id))
    }
}

/// Query parameters for the product listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListQuery {
    /// Page size.
    pub limit: u32,
    /// Number of products to skip.
    pub offset: Option<u32>,
    /// Region for calculated prices.
    pub region_id: Option<RegionId>,
}

impl ProductListQuery {
    /// A first-page query of `limit` products.
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self {
            limit,
            offset: None,
            region_id: None,
        }
    }

    /// Restrict to a region.
    #[must_use]
    pub fn with_region(mut self, region_id: Option<RegionId>) -> Self {
        self.region_id = region_id;
        self
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// One variant + quantity entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Line item ID.
    pub id: LineItemId,
    /// Variant this line refers to.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    /// Product the variant belongs to.
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// Units in the cart.
    pub quantity: u32,
    /// Display title echoed by the backend.
    #[serde(default)]
    pub title: Option<String>,
    /// Thumbnail echoed by the backend.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Unit price echoed by the backend.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

/// A server-side cart mirrored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID, fixed for the lifetime of the cart.
    pub id: CartId,
    /// Line items in backend order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<LineItem>,
    /// Sum of line totals before shipping and tax.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtotal: Decimal,
    /// Grand total.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: Decimal,
    /// Region the cart is priced in.
    #[serde(default)]
    pub region_id: Option<RegionId>,
    /// Cart currency.
    #[serde(default)]
    pub currency_code: Option<String>,
}

impl Cart {
    /// Total units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Find a line item by ID.
    #[must_use]
    pub fn line_item(&self, id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == id)
    }
}

// =============================================================================
// Response Envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ProductListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductResponse {
    pub product: Option<Product>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub collections: Vec<Collection>,
}

/// Cart mutations answer with `{cart}`; line-item deletion on newer backends
/// answers with `{parent}` instead.
#[derive(Debug, Deserialize)]
pub(crate) struct CartResponse {
    #[serde(default)]
    pub cart: Option<Cart>,
    #[serde(default)]
    pub parent: Option<Cart>,
}

impl CartResponse {
    pub(crate) fn into_cart(self) -> Option<Cart> {
        self.cart.or(self.parent)
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CreateCartBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddLineItemBody<'a> {
    pub variant_id: &'a str,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateLineItemBody {
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_tolerates_nulls_and_missing_fields() {
        let product: Product = serde_json::from_value(json!({
            "id": "prod_1",
            "title": null,
            "variants": null,
            "unknown_field": 42
        }))
        .unwrap();

        assert_eq!(product.id, Some(ProductId::new("prod_1")));
        assert!(product.title.is_empty());
        assert!(product.variants.is_empty());
    }

    #[test]
    fn test_calculated_price_accepts_scalar_and_set() {
        let scalar: ProductVariant =
            serde_json::from_value(json!({"id": "v1", "calculated_price": 1200})).unwrap();
        assert_eq!(
            scalar.calculated_price,
            Some(CalculatedPrice::Amount(Decimal::from(1200)))
        );

        let set: ProductVariant = serde_json::from_value(json!({
            "id": "v2",
            "calculated_price": {"calculated_amount": 999, "currency_code": "usd"}
        }))
        .unwrap();
        assert!(matches!(set.calculated_price, Some(CalculatedPrice::Set(_))));
    }

    #[test]
    fn test_cart_response_accepts_parent_envelope() {
        let response: CartResponse = serde_json::from_value(json!({
            "id": "item_1",
            "object": "line-item",
            "deleted": true,
            "parent": {"id": "cart_1", "items": [], "subtotal": 0, "total": 0}
        }))
        .unwrap();

        let cart = response.into_cart().unwrap();
        assert_eq!(cart.id, CartId::new("cart_1"));
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_cart_item_count_sums_quantities() {
        let cart: Cart = serde_json::from_value(json!({
            "id": "cart_1",
            "items": [
                {"id": "li_1", "variant_id": "v1", "quantity": 2},
                {"id": "li_2", "variant_id": "v2", "quantity": 3}
            ],
            "subtotal": 5000,
            "total": 5500
        }))
        .unwrap();

        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total, Decimal::from(5500));
        assert!(cart.line_item(&LineItemId::new("li_2")).is_some());
    }
}
