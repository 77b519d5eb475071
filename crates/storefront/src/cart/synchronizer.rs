//! The cart synchronizer.

use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError, RwLock};

use pps_core::{CartId, LineItemId, Quantity, VariantId};
use tokio::sync::{Mutex, oneshot, watch};
use tracing::{debug, info, instrument};

use crate::medusa::{Cart, RemoteServiceError, StoreApi};
use crate::storage::DurableStore;

use super::{CartError, CartObserver, CartPersistence, CartSummary};

type Snapshot = Option<Arc<Cart>>;

/// Keeps one visitor's local cart in step with the backend.
///
/// The snapshot lives in a `watch` channel; this type is its only writer.
/// Mutations are not serialized against each other (the last response to
/// arrive wins); only cart creation is guarded. Swapping a snapshot in and
/// handing it to the observers happen under one lock, so observers see
/// snapshots in the same order as the channel.
pub struct CartSynchronizer<A> {
    api: A,
    state: watch::Sender<Snapshot>,
    create_guard: Mutex<()>,
    publish_lock: StdMutex<()>,
    observers: RwLock<Vec<Arc<dyn CartObserver>>>,
}

impl<A: StoreApi> CartSynchronizer<A> {
    /// A synchronizer with no cart and no persistence.
    pub fn new(api: A) -> Self {
        Self::with_snapshot(api, None)
    }

    /// A synchronizer restored from durable storage.
    ///
    /// The persisted snapshot (if readable) becomes the current cart, and a
    /// [`CartPersistence`] observer keeps storage updated from then on.
    pub fn restore(api: A, store: Arc<dyn DurableStore>) -> Self {
        let persistence = CartPersistence::new(store);
        let restored = persistence.load().map(Arc::new);
        if let Some(cart) = &restored {
            debug!(cart_id = %cart.id, items = cart.items.len(), "Restored cart snapshot");
        }

        let synchronizer = Self::with_snapshot(api, restored);
        synchronizer.add_observer(Arc::new(persistence));
        synchronizer
    }

    fn with_snapshot(api: A, snapshot: Snapshot) -> Self {
        let (state, _) = watch::channel(snapshot);
        Self {
            api,
            state,
            create_guard: Mutex::new(()),
            publish_lock: StdMutex::new(()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer for future snapshots.
    pub fn add_observer(&self, observer: Arc<dyn CartObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The current cart, if any.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// ID of the current cart, if any.
    #[must_use]
    pub fn cart_id(&self) -> Option<CartId> {
        self.state.borrow().as_ref().map(|cart| cart.id.clone())
    }

    /// Item count and totals of the current cart.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::of(self.state.borrow().as_deref())
    }

    /// A receiver that sees every future snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Return the current cart ID, creating a remote cart if there is none.
    ///
    /// Concurrent callers share a single creation.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Remote` if cart creation fails.
    #[instrument(skip(self))]
    pub async fn ensure_cart(&self) -> Result<CartId, CartError> {
        if let Some(id) = self.cart_id() {
            return Ok(id);
        }

        let _guard = self.create_guard.lock().await;

        // Another caller may have created the cart while we waited
        if let Some(id) = self.cart_id() {
            return Ok(id);
        }

        let cart = self.api.create_cart().await?;
        let id = cart.id.clone();
        info!(cart_id = %id, "Created cart");
        let pending = self.publish(Some(Arc::new(cart)));
        settle(pending).await;
        Ok(id)
    }

    /// Add `quantity` units of a variant.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` for a zero quantity, or
    /// `CartError::Remote` if the backend call fails.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn add_item(
        &self,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Arc<Cart>, CartError> {
        let quantity = Quantity::new(quantity)?;
        let cart_id = self.ensure_cart().await?;
        let cart = self.api.add_line_item(&cart_id, variant_id, quantity).await?;
        self.apply(&cart_id, cart).await
    }

    /// Set the quantity of a line item.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` for a zero quantity (before any
    /// network call), or `CartError::Remote` if the backend call fails.
    #[instrument(skip(self), fields(line_item_id = %line_item_id))]
    pub async fn update_item(
        &self,
        line_item_id: &LineItemId,
        quantity: u32,
    ) -> Result<Arc<Cart>, CartError> {
        let quantity = Quantity::new(quantity)?;
        let cart_id = self.ensure_cart().await?;
        let cart = self
            .api
            .update_line_item(&cart_id, line_item_id, quantity)
            .await?;
        self.apply(&cart_id, cart).await
    }

    /// Remove a line item. Removing the last item leaves an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Remote` if the backend call fails.
    #[instrument(skip(self), fields(line_item_id = %line_item_id))]
    pub async fn remove_item(&self, line_item_id: &LineItemId) -> Result<Arc<Cart>, CartError> {
        let cart_id = self.ensure_cart().await?;
        let cart = self.api.delete_line_item(&cart_id, line_item_id).await?;
        self.apply(&cart_id, cart).await
    }

    /// Replace local state with the backend's copy of the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Remote` if the backend call fails.
    #[instrument(skip(self))]
    pub async fn refresh_cart(&self) -> Result<Arc<Cart>, CartError> {
        let cart_id = self.ensure_cart().await?;
        let cart = self.api.retrieve_cart(&cart_id).await?;
        self.apply(&cart_id, cart).await
    }

    /// Forget the current cart. The next mutation creates a new one.
    ///
    /// Responses to calls still in flight for the forgotten cart are
    /// dropped.
    pub async fn clear_cart(&self) {
        if let Some(id) = self.cart_id() {
            info!(cart_id = %id, "Cleared cart");
        }
        let pending = self.publish(None);
        settle(pending).await;
    }

    /// Swap in a backend response for the cart `expected`.
    ///
    /// The response is returned but not applied when `expected` is no longer
    /// the current cart.
    async fn apply(&self, expected: &CartId, cart: Cart) -> Result<Arc<Cart>, CartError> {
        if &cart.id != expected {
            return Err(RemoteServiceError::MalformedResponse(format!(
                "response is for cart {} but {expected} was mutated",
                cart.id
            ))
            .into());
        }

        let cart = Arc::new(cart);
        let pending = {
            let order = self.lock_publish();
            if self.cart_id().as_ref() != Some(expected) {
                debug!(
                    cart_id = %expected,
                    "Cart was cleared during the call; dropping response"
                );
                return Ok(cart);
            }

            debug!(
                cart_id = %cart.id,
                items = cart.items.len(),
                total = %cart.total,
                "Replaced local cart"
            );
            self.deliver(&order, Some(Arc::clone(&cart)))
        };
        settle(pending).await;
        Ok(cart)
    }

    fn publish(&self, snapshot: Snapshot) -> Vec<oneshot::Receiver<()>> {
        let order = self.lock_publish();
        self.deliver(&order, snapshot)
    }

    /// Swap `snapshot` in and hand it to every observer.
    fn deliver(
        &self,
        _order: &MutexGuard<'_, ()>,
        snapshot: Snapshot,
    ) -> Vec<oneshot::Receiver<()>> {
        self.state.send_replace(snapshot.clone());

        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        observers
            .iter()
            .filter_map(|observer| {
                observer.on_snapshot(snapshot.as_ref());
                observer.flush()
            })
            .collect()
    }

    fn lock_publish(&self) -> MutexGuard<'_, ()> {
        self.publish_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Wait until observers have handled the snapshots they were given.
async fn settle(pending: Vec<oneshot::Receiver<()>>) {
    for flushed in pending {
        // A dropped sender means the observer stopped; nothing left to wait for
        let _ = flushed.await;
    }
}

impl<A> std::fmt::Debug for CartSynchronizer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSynchronizer")
            .field(
                "cart_id",
                &self.state.borrow().as_ref().map(|cart| cart.id.clone()),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::medusa::{Collection, LineItem, Product, ProductListQuery};
    use crate::storage::{CART_KEY, MemoryStore, StorageError};
    use pps_core::ProductId;
    use rust_decimal::Decimal;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-process backend that keeps carts in a map and counts calls.
    #[derive(Default)]
    struct FakeStore {
        carts: StdMutex<HashMap<CartId, Cart>>,
        creates: AtomicUsize,
        calls: AtomicUsize,
        fail_mutations: bool,
        wrong_cart_id: bool,
        /// Per-call delays applied after a line item is added, before the
        /// response is returned.
        add_delays: StdMutex<VecDeque<Duration>>,
    }

    impl FakeStore {
        fn failing() -> Self {
            Self {
                fail_mutations: true,
                ..Self::default()
            }
        }

        fn mutate(
            &self,
            cart_id: &CartId,
            f: impl FnOnce(&mut Cart),
        ) -> Result<Cart, RemoteServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations {
                return Err(RemoteServiceError::HttpStatus {
                    status: 400,
                    body: "rejected".to_string(),
                });
            }
            let mut carts = self.carts.lock().unwrap();
            let cart = carts
                .get_mut(cart_id)
                .ok_or_else(|| RemoteServiceError::HttpStatus {
                    status: 404,
                    body: "Cart not found".to_string(),
                })?;
            f(cart);
            cart.subtotal = cart
                .items
                .iter()
                .map(|i| Decimal::from(i.quantity) * Decimal::from(1000))
                .sum();
            cart.total = cart.subtotal;

            let mut response = cart.clone();
            if self.wrong_cart_id {
                response.id = CartId::new("cart_other");
            }
            Ok(response)
        }
    }

    impl StoreApi for FakeStore {
        async fn list_products(
            &self,
            _query: &ProductListQuery,
        ) -> Result<Vec<Product>, RemoteServiceError> {
            Ok(Vec::new())
        }

        async fn retrieve_product(&self, _id: &ProductId) -> Result<Product, RemoteServiceError> {
            Err(RemoteServiceError::HttpStatus {
                status: 404,
                body: String::new(),
            })
        }

        async fn list_collections(&self) -> Result<Vec<Collection>, RemoteServiceError> {
            Ok(Vec::new())
        }

        async fn create_cart(&self) -> Result<Cart, RemoteServiceError> {
            let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Give concurrent callers a chance to pile up behind the guard
            tokio::time::sleep(Duration::from_millis(20)).await;

            let cart = Cart {
                id: CartId::new(format!("cart_{n}")),
                items: Vec::new(),
                subtotal: Decimal::ZERO,
                total: Decimal::ZERO,
                region_id: None,
                currency_code: Some("usd".to_string()),
            };
            self.carts
                .lock()
                .unwrap()
                .insert(cart.id.clone(), cart.clone());
            Ok(cart)
        }

        async fn retrieve_cart(&self, cart_id: &CartId) -> Result<Cart, RemoteServiceError> {
            self.mutate(cart_id, |_| {})
        }

        async fn add_line_item(
            &self,
            cart_id: &CartId,
            variant_id: &VariantId,
            quantity: Quantity,
        ) -> Result<Cart, RemoteServiceError> {
            let delay = self.add_delays.lock().unwrap().pop_front();
            let response = self.mutate(cart_id, |cart| {
                let n = cart.items.len() + 1;
                cart.items.push(LineItem {
                    id: LineItemId::new(format!("li_{n}")),
                    variant_id: Some(variant_id.clone()),
                    product_id: None,
                    quantity: quantity.get(),
                    title: None,
                    thumbnail: None,
                    unit_price: Some(Decimal::from(1000)),
                });
            });
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        }

        async fn update_line_item(
            &self,
            cart_id: &CartId,
            line_item_id: &LineItemId,
            quantity: Quantity,
        ) -> Result<Cart, RemoteServiceError> {
            self.mutate(cart_id, |cart| {
                if let Some(item) = cart.items.iter_mut().find(|i| &i.id == line_item_id) {
                    item.quantity = quantity.get();
                }
            })
        }

        async fn delete_line_item(
            &self,
            cart_id: &CartId,
            line_item_id: &LineItemId,
        ) -> Result<Cart, RemoteServiceError> {
            self.mutate(cart_id, |cart| cart.items.retain(|i| &i.id != line_item_id))
        }
    }

    /// Durable store whose writes always fail.
    struct FailingStore;

    impl DurableStore for FailingStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set_item(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                message: "disk full".to_string(),
            })
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                message: "disk full".to_string(),
            })
        }
    }

    /// In-memory durable store that can stall its next write.
    #[derive(Default)]
    struct StallingStore {
        inner: MemoryStore,
        stall_next: AtomicBool,
    }

    impl DurableStore for StallingStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.stall_next.swap(false, Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(200));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove_item(key)
        }
    }

    fn stored_cart(store: &dyn DurableStore) -> Option<Cart> {
        crate::storage::load_json(store, CART_KEY)
    }

    fn variant() -> VariantId {
        VariantId::new("variant_1")
    }

    #[tokio::test]
    async fn test_ensure_cart_twice_creates_once() {
        let api = Arc::new(FakeStore::default());
        let sync = CartSynchronizer::new(Arc::clone(&api));

        let first = sync.ensure_cart().await.unwrap();
        let second = sync.ensure_cart().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(api.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ensure_cart_creates_once() {
        let api = Arc::new(FakeStore::default());
        let sync = Arc::new(CartSynchronizer::new(Arc::clone(&api)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sync = Arc::clone(&sync);
                tokio::spawn(async move { sync.ensure_cart().await.unwrap() })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        assert_eq!(api.creates.load(Ordering::SeqCst), 1);
        assert!(ids.iter().all(|id| id == &ids[0]));
    }

    #[tokio::test]
    async fn test_local_cart_equals_last_response() {
        let api = Arc::new(FakeStore::default());
        let sync = CartSynchronizer::new(Arc::clone(&api));

        sync.add_item(&variant(), 1).await.unwrap();
        sync.add_item(&VariantId::new("variant_2"), 2).await.unwrap();
        sync.update_item(&LineItemId::new("li_1"), 3).await.unwrap();
        let last = sync.remove_item(&LineItemId::new("li_2")).await.unwrap();

        let snapshot = sync.snapshot().unwrap();
        assert_eq!(*snapshot, *last);
        let remote = api.carts.lock().unwrap().get(&last.id).cloned().unwrap();
        assert_eq!(*snapshot, remote);
        assert_eq!(sync.summary().item_count, 3);
        assert_eq!(sync.summary().total, Decimal::from(3000));
    }

    #[tokio::test]
    async fn test_removing_last_item_leaves_empty_cart() {
        let sync = CartSynchronizer::new(FakeStore::default());
        sync.add_item(&variant(), 1).await.unwrap();

        let cart = sync.remove_item(&LineItemId::new("li_1")).await.unwrap();
        assert!(cart.items.is_empty());
        assert!(sync.snapshot().is_some());
        assert_eq!(sync.summary().item_count, 0);
    }

    #[tokio::test]
    async fn test_update_to_zero_is_rejected_without_network() {
        let api = Arc::new(FakeStore::default());
        let sync = CartSynchronizer::new(Arc::clone(&api));

        let err = sync
            .update_item(&LineItemId::new("li_1"), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::InvalidArgument(_)));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert!(sync.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_state_unchanged() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let api = Arc::new(FakeStore::failing());
        let sync = CartSynchronizer::restore(Arc::clone(&api), Arc::clone(&store));

        let cart_id = sync.ensure_cart().await.unwrap();
        let before = sync.snapshot();
        let stored_before = store.get_item(CART_KEY).unwrap();

        let err = sync.add_item(&variant(), 1).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::Remote(RemoteServiceError::HttpStatus { status: 400, .. })
        ));
        assert_eq!(sync.snapshot(), before);
        assert_eq!(sync.cart_id(), Some(cart_id));
        assert_eq!(store.get_item(CART_KEY).unwrap(), stored_before);
    }

    #[tokio::test]
    async fn test_mismatched_cart_id_is_rejected() {
        let api = Arc::new(FakeStore {
            wrong_cart_id: true,
            ..FakeStore::default()
        });
        let sync = CartSynchronizer::new(Arc::clone(&api));
        let cart_id = sync.ensure_cart().await.unwrap();

        let err = sync.add_item(&variant(), 1).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::Remote(RemoteServiceError::MalformedResponse(_))
        ));
        assert_eq!(sync.cart_id(), Some(cart_id));
        assert!(sync.snapshot().unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_block_mutation() {
        let sync = CartSynchronizer::restore(FakeStore::default(), Arc::new(FailingStore));

        let cart = sync.add_item(&variant(), 2).await.unwrap();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(sync.summary().item_count, 2);
    }

    #[tokio::test]
    async fn test_restore_after_restart() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let api = Arc::new(FakeStore::default());

        let cart_id = {
            let sync = CartSynchronizer::restore(Arc::clone(&api), Arc::clone(&store));
            sync.add_item(&variant(), 1).await.unwrap();
            sync.cart_id().unwrap()
        };

        let restored = CartSynchronizer::restore(Arc::clone(&api), store);
        assert_eq!(restored.cart_id(), Some(cart_id));
        assert_eq!(restored.summary().item_count, 1);

        // Restored carts are reused, not recreated
        restored.add_item(&variant(), 1).await.unwrap();
        assert_eq!(api.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_replaces_local_state() {
        let api = Arc::new(FakeStore::default());
        let sync = CartSynchronizer::new(Arc::clone(&api));
        let cart_id = sync.ensure_cart().await.unwrap();

        // Mutate the backend behind the synchronizer's back
        api.carts
            .lock()
            .unwrap()
            .get_mut(&cart_id)
            .unwrap()
            .items
            .push(LineItem {
                id: LineItemId::new("li_x"),
                variant_id: Some(variant()),
                product_id: None,
                quantity: 4,
                title: None,
                thumbnail: None,
                unit_price: None,
            });

        let cart = sync.refresh_cart().await.unwrap();
        assert_eq!(cart.item_count(), 4);
        assert_eq!(sync.summary().item_count, 4);
    }

    #[tokio::test]
    async fn test_clear_cart_removes_snapshot_and_storage() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let api = Arc::new(FakeStore::default());
        let sync = CartSynchronizer::restore(Arc::clone(&api), Arc::clone(&store));
        sync.add_item(&variant(), 1).await.unwrap();
        assert!(store.get_item(CART_KEY).unwrap().is_some());

        sync.clear_cart().await;

        assert!(sync.snapshot().is_none());
        assert!(store.get_item(CART_KEY).unwrap().is_none());

        sync.ensure_cart().await.unwrap();
        assert_eq!(api.creates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_new_snapshots() {
        let sync = CartSynchronizer::new(FakeStore::default());
        let mut rx = sync.subscribe();
        assert!(rx.borrow_and_update().is_none());

        sync.add_item(&variant(), 1).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().item_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_mutations_leave_storage_matching_memory() {
        let stalling = Arc::new(StallingStore::default());
        let store: Arc<dyn DurableStore> = stalling.clone();
        let api = Arc::new(FakeStore::default());
        let sync = Arc::new(CartSynchronizer::restore(
            Arc::clone(&api),
            Arc::clone(&store),
        ));
        sync.ensure_cart().await.unwrap();
        stalling.stall_next.store(true, Ordering::SeqCst);

        // The first add answers late, so responses arrive out of call order
        api.add_delays
            .lock()
            .unwrap()
            .extend([Duration::from_millis(50), Duration::ZERO]);

        let slow = {
            let sync = Arc::clone(&sync);
            tokio::spawn(async move { sync.add_item(&variant(), 1).await.unwrap() })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let fast = {
            let sync = Arc::clone(&sync);
            tokio::spawn(
                async move { sync.add_item(&VariantId::new("variant_2"), 1).await.unwrap() },
            )
        };
        slow.await.unwrap();
        fast.await.unwrap();

        let memory = sync.snapshot().unwrap();
        assert_eq!(stored_cart(store.as_ref()).unwrap(), *memory);

        let restored = CartSynchronizer::restore(Arc::clone(&api), store);
        assert_eq!(restored.snapshot(), Some(memory));
    }

    #[tokio::test]
    async fn test_response_after_clear_is_dropped() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let api = Arc::new(FakeStore::default());
        let sync = Arc::new(CartSynchronizer::restore(
            Arc::clone(&api),
            Arc::clone(&store),
        ));
        sync.ensure_cart().await.unwrap();
        api.add_delays
            .lock()
            .unwrap()
            .push_back(Duration::from_millis(100));

        let in_flight = {
            let sync = Arc::clone(&sync);
            tokio::spawn(async move { sync.add_item(&variant(), 1).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        sync.clear_cart().await;

        let response = in_flight.await.unwrap().unwrap();
        assert_eq!(response.item_count(), 1);
        assert!(sync.snapshot().is_none());
        assert!(store.get_item(CART_KEY).unwrap().is_none());
    }
}
