//! CLI command implementations.

pub mod cart;
pub mod catalog;

use std::sync::Arc;

use pps_storefront::cache::ProductCache;
use pps_storefront::cart::CartSynchronizer;
use pps_storefront::config::{ConfigError, StorefrontConfig};
use pps_storefront::medusa::MedusaClient;
use pps_storefront::storage::FileStore;

/// Shared setup for every command.
pub struct Context {
    pub config: StorefrontConfig,
    pub client: MedusaClient,
    pub products: ProductCache,
}

impl Context {
    /// Load configuration and restore the product cache from the data
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = StorefrontConfig::from_env()?;
        let client = MedusaClient::new(&config.medusa);
        let products = ProductCache::new(Arc::new(FileStore::new(&config.data_dir)));

        tracing::debug!(medusa = ?config.medusa, "Loaded configuration");

        Ok(Self {
            config,
            client,
            products,
        })
    }

    /// The locally persisted cart named `visitor`.
    ///
    /// # Errors
    ///
    /// Returns an error if `visitor` is not a plain name.
    pub fn cart(&self, visitor: &str) -> Result<CartSynchronizer<MedusaClient>, String> {
        if visitor.is_empty()
            || !visitor
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!("invalid cart name: {visitor}"));
        }

        let store = FileStore::new(self.config.carts_dir().join(visitor));
        Ok(CartSynchronizer::restore(
            self.client.clone(),
            Arc::new(store),
        ))
    }
}
