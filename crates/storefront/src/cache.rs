//! Product cache with durable-storage fallback.
//!
//! Products are keyed by ID and overwritten wholesale on re-fetch; entries
//! never expire. Every change writes the full map through to durable storage
//! under [`PRODUCTS_KEY`] in the order the changes were made, and lookups that miss memory consult that snapshot
//! before giving up.
//!
//! The cache never talks to the backend. Callers populate it by listing
//! products (see [`crate::services::catalog::load_products`]).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use pps_core::ProductId;
use tracing::{debug, warn};

use crate::medusa::Product;
use crate::storage::{self, DurableStore, PRODUCTS_KEY};

type ProductMap = HashMap<ProductId, Product>;

/// In-memory product map backed by durable storage.
///
/// Cheap to clone; clones share the same map.
#[derive(Clone)]
pub struct ProductCache {
    inner: Arc<ProductCacheInner>,
}

struct ProductCacheInner {
    products: RwLock<Versioned>,
    /// Version of the last map written to `store`.
    persisted: Mutex<u64>,
    store: Arc<dyn DurableStore>,
}

/// The product map and a counter bumped on every change that must be
/// persisted.
struct Versioned {
    map: ProductMap,
    version: u64,
}

impl ProductCache {
    /// Create a cache, restoring the last persisted snapshot into memory.
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        let products: ProductMap = storage::load_json(store.as_ref(), PRODUCTS_KEY).unwrap_or_default();
        debug!(count = products.len(), "Restored product cache");

        Self {
            inner: Arc::new(ProductCacheInner {
                products: RwLock::new(Versioned {
                    map: products,
                    version: 0,
                }),
                persisted: Mutex::new(0),
                store,
            }),
        }
    }

    /// Insert or overwrite one product. Products without an ID are skipped.
    pub fn cache_product(&self, product: Product) {
        self.cache_products(std::iter::once(product));
    }

    /// Insert or overwrite many products, then persist the full map once.
    ///
    /// Concurrent callers may finish in any order; storage always ends up
    /// holding the newest map.
    pub fn cache_products(&self, products: impl IntoIterator<Item = Product>) {
        let (version, snapshot) = {
            let mut state = self.write();
            let mut changed = false;
            for product in products {
                let Some(id) = product.id.clone() else {
                    debug!(title = %product.title, "Skipping product without an ID");
                    continue;
                };
                state.map.insert(id, product);
                changed = true;
            }
            if !changed {
                return;
            }
            state.version += 1;
            (state.version, state.map.clone())
        };

        self.persist(version, |store| {
            storage::save_json(store, PRODUCTS_KEY, &snapshot);
        });
    }

    /// Look up a product, falling back to the durable snapshot on a miss.
    ///
    /// A product found only in durable storage is copied back into memory.
    #[must_use]
    pub fn get_cached_product(&self, id: &ProductId) -> Option<Product> {
        if let Some(product) = self.read().map.get(id) {
            return Some(product.clone());
        }

        let stored: ProductMap = storage::load_json(self.inner.store.as_ref(), PRODUCTS_KEY)?;
        let product = stored.get(id)?.clone();

        debug!(product_id = %id, "Backfilled product from durable storage");
        self.write()
            .map
            .entry(id.clone())
            .or_insert_with(|| product.clone());
        Some(product)
    }

    /// Look up a product without ever fetching it remotely.
    ///
    /// A miss is logged: the caller is expected to list products first.
    #[allow(clippy::unused_async)]
    pub async fn get_product(&self, id: &ProductId) -> Option<Product> {
        let product = self.get_cached_product(id);
        if product.is_none() {
            warn!(
                product_id = %id,
                "Product not in cache; list products before requesting details"
            );
        }
        product
    }

    /// All cached products, in no particular order.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.read().map.values().cloned().collect()
    }

    /// Empty the cache and drop its durable snapshot.
    pub fn clear(&self) {
        let version = {
            let mut state = self.write();
            state.map.clear();
            state.version += 1;
            state.version
        };
        self.persist(version, |store| storage::remove(store, PRODUCTS_KEY));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().map.is_empty()
    }

    /// Run `write` for map `version` unless a newer version already reached
    /// storage. Writers are serialized so an older map never lands last.
    fn persist(&self, version: u64, write: impl FnOnce(&dyn DurableStore)) {
        let mut persisted = self
            .inner
            .persisted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *persisted >= version {
            debug!(version, persisted = *persisted, "Skipping stale product snapshot");
            return;
        }
        write(self.inner.store.as_ref());
        *persisted = version;
    }

    // A poisoned lock only means a writer panicked mid-insert; the map is
    // still a valid map.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Versioned> {
        self.inner
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Versioned> {
        self.inner
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ProductCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
