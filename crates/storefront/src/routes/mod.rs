//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Health check
//!
//! # Catalog
//! GET    /api/products               - Product listing (populates the cache)
//! GET    /api/products/{id}          - Cached product detail
//! GET    /api/collections            - Collection listing
//!
//! # Cart (per visitor)
//! GET    /api/cart                   - Cart summary and snapshot
//! DELETE /api/cart                   - Forget the cart
//! POST   /api/cart/items             - Add a variant
//! PATCH  /api/cart/items/{line_id}   - Change a quantity
//! DELETE /api/cart/items/{line_id}   - Remove a line item
//! POST   /api/cart/refresh           - Re-fetch from the backend
//!
//! # Auth
//! POST   /auth/logout                - Logout action
//!
//! # Account (requires auth)
//! GET    /account                    - Account overview
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod collections;
pub mod products;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth_session_middleware, create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{line_id}", patch(cart::update).delete(cart::remove))
        .route("/refresh", post(cart::refresh))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Catalog
        .nest("/api/products", product_routes())
        .route("/api/collections", get(collections::index))
        // Cart
        .nest("/api/cart", cart_routes())
        // Account
        .route("/account", get(account::show))
        // Auth
        .route("/auth/logout", post(auth::logout))
}

/// The full application: routes plus the middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    routes()
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_session_middleware,
        ))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
