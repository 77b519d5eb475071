//! Local cart commands.
//!
//! The cart is persisted under `<data_dir>/carts/<name>/` exactly as the
//! server persists a visitor's cart, so the same snapshot format applies.

use std::io::Write;

use pps_core::{LineItemId, VariantId};
use pps_storefront::cart::{CartSummary, CartSynchronizer};
use pps_storefront::medusa::{Cart, MedusaClient};

type Synchronizer = CartSynchronizer<MedusaClient>;

/// Print the locally stored cart.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn show(cart: &Synchronizer) -> Result<(), std::io::Error> {
    write_cart(
        &mut std::io::stdout().lock(),
        cart.snapshot().as_deref(),
        &cart.summary(),
    )
}

/// Add a variant.
///
/// # Errors
///
/// Returns `CartError` if the quantity is zero or Medusa rejects the call.
pub async fn add(
    cart: &Synchronizer,
    variant_id: &str,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let updated = cart
        .add_item(&VariantId::new(variant_id), quantity)
        .await?;
    print_updated(&updated)
}

/// Change a line item's quantity.
///
/// # Errors
///
/// Returns `CartError` if the quantity is zero or Medusa rejects the call.
pub async fn update(
    cart: &Synchronizer,
    line_item_id: &str,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let updated = cart
        .update_item(&LineItemId::new(line_item_id), quantity)
        .await?;
    print_updated(&updated)
}

/// Remove a line item.
///
/// # Errors
///
/// Returns `CartError` if Medusa rejects the call.
pub async fn remove(
    cart: &Synchronizer,
    line_item_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let updated = cart.remove_item(&LineItemId::new(line_item_id)).await?;
    print_updated(&updated)
}

/// Re-fetch the cart from Medusa.
///
/// # Errors
///
/// Returns `CartError` if Medusa rejects the call.
pub async fn refresh(cart: &Synchronizer) -> Result<(), Box<dyn std::error::Error>> {
    let updated = cart.refresh_cart().await?;
    print_updated(&updated)
}

/// Forget the local cart.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub async fn clear(cart: &Synchronizer) -> Result<(), std::io::Error> {
    cart.clear_cart().await;
    writeln!(std::io::stdout().lock(), "Cart cleared")
}

fn print_updated(cart: &Cart) -> Result<(), Box<dyn std::error::Error>> {
    write_cart(
        &mut std::io::stdout().lock(),
        Some(cart),
        &CartSummary::of(Some(cart)),
    )?;
    Ok(())
}

fn write_cart(
    out: &mut impl Write,
    cart: Option<&Cart>,
    summary: &CartSummary,
) -> Result<(), std::io::Error> {
    let Some(cart) = cart else {
        return writeln!(out, "No cart");
    };

    writeln!(out, "Cart {}", cart.id)?;
    for item in &cart.items {
        writeln!(
            out,
            "  {}  {} x{}",
            item.id,
            item.title
                .as_deref()
                .or_else(|| item.variant_id.as_ref().map(VariantId::as_str))
                .unwrap_or("(unknown variant)"),
            item.quantity
        )?;
    }
    let currency = summary.currency_code.as_deref().unwrap_or("").to_uppercase();
    writeln!(
        out,
        "Items: {}  Subtotal: {} {currency}  Total: {} {currency}",
        summary.item_count, summary.subtotal, summary.total
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_write_cart() {
        let cart: Cart = serde_json::from_value(serde_json::json!({
            "id": "cart_1",
            "items": [{"id": "li_1", "variant_id": "variant_1", "quantity": 2}],
            "subtotal": 3000,
            "total": 3300,
            "currency_code": "usd"
        }))
        .unwrap();

        let mut out = Vec::new();
        write_cart(&mut out, Some(&cart), &CartSummary::of(Some(&cart))).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Cart cart_1\n  li_1  variant_1 x2\nItems: 2  Subtotal: 3000 USD  Total: 3300 USD\n"
        );
    }

    #[test]
    fn test_write_no_cart() {
        let mut out = Vec::new();
        write_cart(&mut out, None, &CartSummary::of(None)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No cart\n");
    }
}
