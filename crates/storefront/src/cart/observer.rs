//! Snapshot observers.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::medusa::Cart;
use crate::storage::{self, CART_KEY, DurableStore};

/// Receives every cart snapshot the synchronizer publishes.
///
/// Snapshots are delivered one at a time, in publish order, while the
/// synchronizer holds its publish lock. Implementations must not block and
/// cannot fail the mutation that triggered them.
pub trait CartObserver: Send + Sync {
    /// `None` means the visitor has no cart.
    fn on_snapshot(&self, cart: Option<&Arc<Cart>>);

    /// A receiver that resolves once every snapshot delivered so far has
    /// been handled. Observers that finish inside `on_snapshot` return `None`.
    fn flush(&self) -> Option<oneshot::Receiver<()>> {
        None
    }
}

enum Command {
    Write(Option<Arc<Cart>>),
    Flush(oneshot::Sender<()>),
}

/// Writes each snapshot to durable storage under [`CART_KEY`].
///
/// Writes run on a background task, one after another in the order the
/// snapshots were published, and each runs on the blocking pool. An empty
/// snapshot removes the key. Write failures are logged by the storage
/// helpers and otherwise ignored.
///
/// The writer task stops once this adapter is dropped and its queue drains.
#[derive(Clone)]
pub struct CartPersistence {
    store: Arc<dyn DurableStore>,
    queue: mpsc::UnboundedSender<Command>,
}

impl CartPersistence {
    /// Start a writer for `store`. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        let (queue, commands) = mpsc::unbounded_channel();
        tokio::spawn(write_snapshots(Arc::clone(&store), commands));
        Self { store, queue }
    }

    /// Load the last persisted snapshot, if any.
    #[must_use]
    pub fn load(&self) -> Option<Cart> {
        storage::load_json(self.store.as_ref(), CART_KEY)
    }
}

impl CartObserver for CartPersistence {
    fn on_snapshot(&self, cart: Option<&Arc<Cart>>) {
        if self.queue.send(Command::Write(cart.cloned())).is_err() {
            warn!("Cart snapshot writer has stopped; snapshot not persisted");
        }
    }

    fn flush(&self) -> Option<oneshot::Receiver<()>> {
        let (done, flushed) = oneshot::channel();
        self.queue.send(Command::Flush(done)).ok()?;
        Some(flushed)
    }
}

async fn write_snapshots(
    store: Arc<dyn DurableStore>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Write(cart) => {
                let store = Arc::clone(&store);
                let written = tokio::task::spawn_blocking(move || match cart {
                    Some(cart) => storage::save_json(store.as_ref(), CART_KEY, cart.as_ref()),
                    None => storage::remove(store.as_ref(), CART_KEY),
                })
                .await;
                if let Err(e) = written {
                    warn!(error = %e, "Cart snapshot write did not complete");
                }
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pps_core::CartId;
    use serde_json::json;

    fn cart(id: &str) -> Arc<Cart> {
        Arc::new(
            serde_json::from_value(json!({"id": id, "items": [], "subtotal": 0, "total": 0}))
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_persistence_writes_and_removes() {
        let store = Arc::new(MemoryStore::new());
        let persistence = CartPersistence::new(store.clone());

        persistence.on_snapshot(Some(&cart("cart_1")));
        persistence.flush().unwrap().await.unwrap();
        assert_eq!(persistence.load().unwrap().id, CartId::new("cart_1"));

        persistence.on_snapshot(None);
        persistence.flush().unwrap().await.unwrap();
        assert!(persistence.load().is_none());
        assert!(store.get_item(CART_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persistence_keeps_publish_order() {
        let store = Arc::new(MemoryStore::new());
        let persistence = CartPersistence::new(store);

        for n in 0..50 {
            persistence.on_snapshot(Some(&cart(&format!("cart_{n}"))));
        }
        persistence.flush().unwrap().await.unwrap();

        assert_eq!(persistence.load().unwrap().id, CartId::new("cart_49"));
    }
}
