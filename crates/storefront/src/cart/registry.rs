//! Per-visitor cart synchronizers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::medusa::StoreApi;
use crate::storage::FileStore;

use super::CartSynchronizer;

/// Synchronizers are dropped after this long without a request; the cart
/// survives in durable storage and is restored on the next visit.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const MAX_ACTIVE_VISITORS: u64 = 10_000;

/// One [`CartSynchronizer`] per visitor, each persisting under
/// `<root>/<visitor id>/`.
#[derive(Clone)]
pub struct VisitorCarts<A> {
    api: A,
    root: PathBuf,
    active: Cache<String, Arc<CartSynchronizer<A>>>,
}

impl<A> VisitorCarts<A>
where
    A: StoreApi + Clone + 'static,
{
    /// Create a registry storing snapshots under `root`.
    pub fn new(api: A, root: impl Into<PathBuf>) -> Self {
        let active = Cache::builder()
            .max_capacity(MAX_ACTIVE_VISITORS)
            .time_to_idle(IDLE_TIMEOUT)
            .build();

        Self {
            api,
            root: root.into(),
            active,
        }
    }

    /// The synchronizer for `visitor_id`, restoring it from disk if it is
    /// not active.
    pub async fn for_visitor(&self, visitor_id: &str) -> Arc<CartSynchronizer<A>> {
        self.active
            .get_with(visitor_id.to_string(), async {
                debug!(visitor_id, "Activating visitor cart");
                let store = FileStore::new(self.root.join(visitor_id));
                Arc::new(CartSynchronizer::restore(self.api.clone(), Arc::new(store)))
            })
            .await
    }

    /// Number of visitors with an active synchronizer.
    #[must_use]
    pub fn active_count(&self) -> u64 {
        self.active.entry_count()
    }
}
