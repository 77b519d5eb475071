//! Client-side cart state.
//!
//! The backend owns the cart; this module mirrors it. Each mutation goes to
//! the backend and the response replaces the local snapshot wholesale, so
//! after any successful call the local cart equals the backend's answer.
//!
//! - [`CartSynchronizer`] - the single writer of one visitor's cart
//! - [`CartObserver`] - receives every new snapshot; [`CartPersistence`]
//!   writes them to durable storage
//! - [`VisitorCarts`] - one synchronizer per anonymous visitor

mod observer;
mod registry;
mod synchronizer;

pub use observer::{CartObserver, CartPersistence};
pub use registry::VisitorCarts;
pub use synchronizer::CartSynchronizer;

use pps_core::QuantityError;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::medusa::{Cart, RemoteServiceError};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The backend call failed; local state is unchanged.
    #[error(transparent)]
    Remote(#[from] RemoteServiceError),

    /// Rejected before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<QuantityError> for CartError {
    fn from(err: QuantityError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Totals derived from the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Sum of line-item quantities.
    pub item_count: u64,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub currency_code: Option<String>,
}

impl CartSummary {
    /// Summarize a snapshot; no cart yields zeros.
    #[must_use]
    pub fn of(cart: Option<&Cart>) -> Self {
        cart.map_or_else(
            || Self {
                item_count: 0,
                subtotal: Decimal::ZERO,
                total: Decimal::ZERO,
                currency_code: None,
            },
            |cart| Self {
                item_count: cart.item_count(),
                subtotal: cart.subtotal,
                total: cart.total,
                currency_code: cart.currency_code.clone(),
            },
        )
    }
}
