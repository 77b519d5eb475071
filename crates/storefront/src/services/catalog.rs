//! Catalog loading.
//!
//! Listing failures degrade to empty results so pages still render; the
//! failure is logged.

use pps_core::ProductId;
use tracing::{error, info, instrument};

use crate::cache::ProductCache;
use crate::medusa::{Collection, Product, ProductListQuery, StoreApi};

/// List products and populate the product cache with them.
///
/// Returns an empty list if the backend call fails.
#[instrument(skip(api, cache), fields(limit = query.limit))]
pub async fn load_products<A: StoreApi>(
    api: &A,
    cache: &ProductCache,
    query: &ProductListQuery,
) -> Vec<Product> {
    match api.list_products(query).await {
        Ok(products) => {
            info!(count = products.len(), "Loaded products");
            cache.cache_products(products.iter().cloned());
            products
        }
        Err(e) => {
            error!(error = %e, "Failed to load products");
            Vec::new()
        }
    }
}

/// List collections. Returns an empty list if the backend call fails.
#[instrument(skip(api))]
pub async fn load_collections<A: StoreApi>(api: &A) -> Vec<Collection> {
    api.list_collections().await.unwrap_or_else(|e| {
        error!(error = %e, "Failed to load collections");
        Vec::new()
    })
}

/// Fetch one product straight from the backend.
///
/// The detail endpoint may omit pricing, so the result is not cached.
#[instrument(skip(api), fields(product_id = %id))]
pub async fn fetch_product_by_id<A: StoreApi>(api: &A, id: &ProductId) -> Option<Product> {
    match api.retrieve_product(id).await {
        Ok(product) => Some(product),
        Err(e) => {
            error!(error = %e, "Failed to fetch product");
            None
        }
    }
}
