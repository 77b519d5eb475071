//! Medusa store API client.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`; no SDK
//! - Medusa is the source of truth for carts and prices - responses replace
//!   local state wholesale
//! - [`StoreApi`] is the seam the cart synchronizer and catalog service are
//!   written against, so they can be exercised without a backend
//!
//! # Endpoints
//!
//! - `GET /store/products`, `GET /store/products/{id}`
//! - `GET /store/collections`
//! - `POST /store/carts`, `GET /store/carts/{id}`
//! - `POST /store/carts/{id}/line-items`
//! - `POST|DELETE /store/carts/{id}/line-items/{line_id}`
//!
//! # Example
//!
//! ```rust,ignore
//! use pps_storefront::medusa::{MedusaClient, StoreApi};
//!
//! let client = MedusaClient::new(&config.medusa);
//!
//! let cart = client.create_cart().await?;
//! let cart = client
//!     .add_line_item(&cart.id, &VariantId::new("variant_123"), Quantity::ONE)
//!     .await?;
//! ```

mod client;
pub mod pricing;
pub mod types;

use std::future::Future;
use std::sync::Arc;

pub use client::MedusaClient;
pub use pricing::{extract_price, lowest_price, price_report};
pub use types::*;

use pps_core::{CartId, LineItemId, ProductId, Quantity, VariantId};
use thiserror::Error;

/// Errors that can occur when talking to the Medusa backend.
#[derive(Debug, Error)]
pub enum RemoteServiceError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// The response body was not the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl RemoteServiceError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) => false,
        }
    }
}

impl From<serde_json::Error> for RemoteServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Remote store operations used by the storefront.
///
/// Implemented by [`MedusaClient`]; tests substitute in-process fakes.
pub trait StoreApi: Send + Sync {
    /// List products with pricing data.
    fn list_products(
        &self,
        query: &ProductListQuery,
    ) -> impl Future<Output = Result<Vec<Product>, RemoteServiceError>> + Send;

    /// Retrieve one product. The detail endpoint may omit pricing.
    fn retrieve_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, RemoteServiceError>> + Send;

    /// List collections.
    fn list_collections(
        &self,
    ) -> impl Future<Output = Result<Vec<Collection>, RemoteServiceError>> + Send;

    /// Create an empty cart.
    fn create_cart(&self) -> impl Future<Output = Result<Cart, RemoteServiceError>> + Send;

    /// Fetch the authoritative state of a cart.
    fn retrieve_cart(
        &self,
        cart_id: &CartId,
    ) -> impl Future<Output = Result<Cart, RemoteServiceError>> + Send;

    /// Add a variant to a cart.
    fn add_line_item(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<Cart, RemoteServiceError>> + Send;

    /// Change the quantity of a line item.
    fn update_line_item(
        &self,
        cart_id: &CartId,
        line_item_id: &LineItemId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<Cart, RemoteServiceError>> + Send;

    /// Remove a line item.
    fn delete_line_item(
        &self,
        cart_id: &CartId,
        line_item_id: &LineItemId,
    ) -> impl Future<Output = Result<Cart, RemoteServiceError>> + Send;
}

impl<T: StoreApi> StoreApi for Arc<T> {
    fn list_products(
        &self,
        query: &ProductListQuery,
    ) -> impl Future<Output = Result<Vec<Product>, RemoteServiceError>> + Send {
        (**self).list_products(query)
    }

    fn retrieve_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, RemoteServiceError>> + Send {
        (**self).retrieve_product(id)
    }

    fn list_collections(
        &self,
    ) -> impl Future<Output = Result<Vec<Collection>, RemoteServiceError>> + Send {
        (**self).list_collections()
    }

    fn create_cart(&self) -> impl Future<Output = Result<Cart, RemoteServiceError>> + Send {
        (**self).create_cart()
    }

    fn retrieve_cart(
        &self,
        cart_id: &CartId,
    ) -> impl Future<Output = Result<Cart, RemoteServiceError>> + Send {
        (**self).retrieve_cart(cart_id)
    }

    fn add_line_item(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<Cart, RemoteServiceError>> + Send {
        (**self).add_line_item(cart_id, variant_id, quantity)
    }

    fn update_line_item(
        &self,
        cart_id: &CartId,
        line_item_id: &LineItemId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<Cart, RemoteServiceError>> + Send {
        (**self).update_line_item(cart_id, line_item_id, quantity)
    }

    fn delete_line_item(
        &self,
        cart_id: &CartId,
        line_item_id: &LineItemId,
    ) -> impl Future<Output = Result<Cart, RemoteServiceError>> + Send {
        (**self).delete_line_item(cart_id, line_item_id)
    }
}
