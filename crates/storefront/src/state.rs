//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::ProductCache;
use crate::cart::{CartSynchronizer, VisitorCarts};
use crate::config::StorefrontConfig;
use crate::medusa::MedusaClient;
use crate::services::auth::{InMemorySessionStore, SessionValidator};
use crate::storage::FileStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, the process-wide product cache, per-visitor carts and
/// the session backend.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    medusa: MedusaClient,
    products: ProductCache,
    carts: VisitorCarts<MedusaClient>,
    sessions: Arc<dyn SessionValidator>,
}

impl AppState {
    /// Create application state with an in-memory session backend.
    ///
    /// The product cache is restored from `<data_dir>` and visitor carts
    /// persist under `<data_dir>/carts/`.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_session_validator(config, Arc::new(InMemorySessionStore::new()))
    }

    /// Create application state with a custom session backend.
    #[must_use]
    pub fn with_session_validator(
        config: StorefrontConfig,
        sessions: Arc<dyn SessionValidator>,
    ) -> Self {
        let medusa = MedusaClient::new(&config.medusa);
        let products = ProductCache::new(Arc::new(FileStore::new(&config.data_dir)));
        let carts = VisitorCarts::new(medusa.clone(), config.carts_dir());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                medusa,
                products,
                carts,
                sessions,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Medusa store API client.
    #[must_use]
    pub fn medusa(&self) -> &MedusaClient {
        &self.inner.medusa
    }

    /// Get a reference to the product cache.
    #[must_use]
    pub fn products(&self) -> &ProductCache {
        &self.inner.products
    }

    /// Get the cart synchronizer for a visitor.
    pub async fn cart_for(&self, visitor_id: &str) -> Arc<CartSynchronizer<MedusaClient>> {
        self.inner.carts.for_visitor(visitor_id).await
    }

    /// Get a reference to the session backend.
    #[must_use]
    pub fn sessions(&self) -> &dyn SessionValidator {
        self.inner.sessions.as_ref()
    }
}
