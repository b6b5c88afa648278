//! Request coalescing: every caller asking for the same key while a call is
//! in flight receives that call's result instead of starting another.
//!
//! Used for the credential refresh slot, the response cache's pending table
//! and session initialization. A slot is removed exactly once, by the future
//! that owns it, after it completes (success or failure).

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

/// A clonable handle to an in-flight call. Awaiting any clone drives it.
pub type InFlight<V> = Shared<BoxFuture<'static, V>>;

struct Slot<V> {
    id: u64,
    future: InFlight<V>,
}

type Slots<K, V> = Arc<Mutex<HashMap<K, Slot<V>>>>;

fn lock<K, V>(slots: &Slots<K, V>) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Coalescer<K, V> {
    slots: Slots<K, V>,
    next_id: AtomicU64,
}

impl<K, V> Coalescer<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// The call currently in flight for `key`, if any.
    pub fn join(&self, key: &K) -> Option<InFlight<V>> {
        lock(&self.slots).get(key).map(|slot| slot.future.clone())
    }

    /// Attach to the call in flight for `key`, or start one with `start`.
    ///
    /// `start` is only invoked when nothing is in flight. The returned
    /// future is lazy: it runs when first awaited.
    pub fn run<F, Fut>(&self, key: K, start: F) -> InFlight<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let mut slots = lock(&self.slots);
        if let Some(slot) = slots.get(&key) {
            return slot.future.clone();
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let call = start();
        let owner = Arc::clone(&self.slots);
        let owned_key = key.clone();

        let future = async move {
            let output = call.await;
            let mut slots = lock(&owner);
            // A clear() may have dropped this slot and a newer call may own the key now.
            if slots.get(&owned_key).is_some_and(|slot| slot.id == id) {
                slots.remove(&owned_key);
            }
            output
        }
        .boxed()
        .shared();

        slots.insert(
            key,
            Slot {
                id,
                future: future.clone(),
            },
        );
        future
    }

    /// Forget every in-flight call. Calls already awaited keep running for
    /// their current waiters; new callers start fresh.
    pub fn clear(&self) {
        lock(&self.slots).clear();
    }

    /// Forget the in-flight calls whose key matches `predicate`.
    pub fn forget(&self, predicate: impl Fn(&K) -> bool) {
        lock(&self.slots).retain(|key, _| !predicate(key));
    }

    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        lock(&self.slots).contains_key(key)
    }
}

impl<K, V> Default for Coalescer<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Coalescer<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let in_flight = lock(&self.slots).len();
        f.debug_struct("Coalescer").field("in_flight", &in_flight).finish()
    }
}
