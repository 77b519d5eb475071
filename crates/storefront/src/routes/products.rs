//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use pps_core::{Price, ProductId};

use crate::error::{AppError, Result};
use crate::medusa::{Product, ProductListQuery, lowest_price};
use crate::services::catalog;
use crate::state::AppState;

/// A product with its lowest variant price, for listings.
#[derive(Debug, Serialize)]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    pub price: Option<Price>,
}

impl From<Product> for ProductSummary {
    fn from(product: Product) -> Self {
        let price = lowest_price(&product);
        Self { product, price }
    }
}

/// List products, populating the product cache.
///
/// A backend failure yields an empty list.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<ProductSummary>> {
    let config = &state.config().medusa;
    let query = ProductListQuery::new(config.product_limit);

    let products = catalog::load_products(state.medusa(), state.products(), &query).await;
    Json(products.into_iter().map(ProductSummary::from).collect())
}

/// Show one cached product. Products are only known after a listing.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductSummary>> {
    let id = ProductId::new(id);
    state
        .products()
        .get_product(&id)
        .await
        .map(|product| Json(ProductSummary::from(product)))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
