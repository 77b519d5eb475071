//! Cart route handlers.
//!
//! Each visitor has its own cart, selected by the visitor session. Every
//! mutation answers with the visitor's updated cart.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pps_core::{LineItemId, VariantId};

use crate::cart::CartSummary;
use crate::error::Result;
use crate::medusa::Cart;
use crate::middleware::Visitor;
use crate::state::AppState;

/// The visitor's cart and its derived totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub summary: CartSummary,
    pub cart: Option<Arc<Cart>>,
}

impl CartView {
    fn new(cart: Option<Arc<Cart>>) -> Self {
        Self {
            summary: CartSummary::of(cart.as_deref()),
            cart,
        }
    }
}

/// Body of `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub variant_id: VariantId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Body of `PATCH /api/cart/items/{line_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// Show the visitor's cart as held locally.
#[instrument(skip(state, visitor))]
pub async fn show(State(state): State<AppState>, visitor: Visitor) -> Json<CartView> {
    let cart = state.cart_for(&visitor.0).await;
    Json(CartView::new(cart.snapshot()))
}

/// Add a variant to the cart, creating the cart if needed.
#[instrument(skip(state, visitor))]
pub async fn add(
    State(state): State<AppState>,
    visitor: Visitor,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let cart = state.cart_for(&visitor.0).await;
    let updated = cart.add_item(&body.variant_id, body.quantity).await?;
    Ok(Json(CartView::new(Some(updated))))
}

/// Change a line item's quantity.
#[instrument(skip(state, visitor))]
pub async fn update(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(line_id): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let cart = state.cart_for(&visitor.0).await;
    let updated = cart
        .update_item(&LineItemId::new(line_id), body.quantity)
        .await?;
    Ok(Json(CartView::new(Some(updated))))
}

/// Remove a line item.
#[instrument(skip(state, visitor))]
pub async fn remove(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(line_id): Path<String>,
) -> Result<Json<CartView>> {
    let cart = state.cart_for(&visitor.0).await;
    let updated = cart.remove_item(&LineItemId::new(line_id)).await?;
    Ok(Json(CartView::new(Some(updated))))
}

/// Re-fetch the cart from the backend.
#[instrument(skip(state, visitor))]
pub async fn refresh(State(state): State<AppState>, visitor: Visitor) -> Result<Json<CartView>> {
    let cart = state.cart_for(&visitor.0).await;
    let updated = cart.refresh_cart().await?;
    Ok(Json(CartView::new(Some(updated))))
}

/// Forget the visitor's cart.
#[instrument(skip(state, visitor))]
pub async fn clear(State(state): State<AppState>, visitor: Visitor) -> StatusCode {
    state.cart_for(&visitor.0).await.clear_cart().await;
    StatusCode::NO_CONTENT
}
