//! Catalog inspection commands.

use std::io::Write;

use pps_core::ProductId;
use pps_storefront::medusa::{Product, ProductListQuery, price_report};
use pps_storefront::services::catalog;

use super::Context;

/// List products, fill the cache, and print each variant's price.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub async fn products(ctx: &Context, limit: Option<u32>) -> Result<(), std::io::Error> {
    let query = ProductListQuery::new(limit.unwrap_or(ctx.config.medusa.product_limit));
    let products = catalog::load_products(&ctx.client, &ctx.products, &query).await;

    let mut out = std::io::stdout().lock();
    if products.is_empty() {
        writeln!(out, "No products")?;
    }
    for product in &products {
        write_product(&mut out, product)?;
    }

    tracing::info!(
        listed = products.len(),
        cached = ctx.products.len(),
        "Product cache updated"
    );
    Ok(())
}

/// Show one product from the cache, or from Medusa with `remote`.
///
/// # Errors
///
/// Returns an error if the product is unknown or stdout fails.
pub async fn product(
    ctx: &Context,
    id: &str,
    remote: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = ProductId::new(id);
    let product = if remote {
        catalog::fetch_product_by_id(&ctx.client, &id).await
    } else {
        ctx.products.get_product(&id).await
    };

    let product = product.ok_or_else(|| {
        if remote {
            format!("product {id} not found")
        } else {
            format!("product {id} is not cached; run `pps-cli products` first")
        }
    })?;

    write_product(&mut std::io::stdout().lock(), &product)?;
    Ok(())
}

/// List collections.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub async fn collections(ctx: &Context) -> Result<(), std::io::Error> {
    let collections = catalog::load_collections(&ctx.client).await;

    let mut out = std::io::stdout().lock();
    if collections.is_empty() {
        writeln!(out, "No collections")?;
    }
    for collection in &collections {
        writeln!(
            out,
            "{}  {}  ({})",
            collection.id,
            collection.title,
            collection.handle.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

fn write_product(out: &mut impl Write, product: &Product) -> Result<(), std::io::Error> {
    let id = product.id.as_ref().map_or("(no id)", ProductId::as_str);
    writeln!(out, "{id}  {}", product.title)?;
    for line in price_report(product) {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_write_product() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "prod_1",
            "title": "Tee",
            "variants": [
                {"title": "M", "prices": [{"amount": 1500, "currency_code": "usd"}]},
                {"title": "L"}
            ]
        }))
        .unwrap();

        let mut out = Vec::new();
        write_product(&mut out, &product).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "prod_1  Tee\n    M: 1500 USD\n    L: no price available\n"
        );
    }
}
