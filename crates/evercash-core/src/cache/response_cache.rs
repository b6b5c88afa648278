use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::api::ApiError;
use crate::coalesce::Coalescer;

/// TTLs shorter than this are raised to it.
const MIN_TTL: Duration = Duration::from_secs(1);

/// Values the cache can hold.
///
/// Empty successful results are never stored, so a later real result is not
/// masked by an early empty one.
pub trait CacheValue: Clone + Send + Sync + 'static {
    fn is_empty_result(&self) -> bool {
        false
    }
}

impl<T: Clone + Send + Sync + 'static> CacheValue for Vec<T> {
    fn is_empty_result(&self) -> bool {
        self.is_empty()
    }
}

impl CacheValue for String {
    fn is_empty_result(&self) -> bool {
        self.is_empty()
    }
}

impl CacheValue for serde_json::Value {
    fn is_empty_result(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(fields) => fields.is_empty(),
            serde_json::Value::String(text) => text.is_empty(),
            _ => false,
        }
    }
}

type Erased = Arc<dyn Any + Send + Sync>;

struct CacheEntry {
    value: Erased,
    expires_at: Instant,
}

/// Stored entries plus the token of the fetch currently allowed to store
/// each key. Invalidation and `clear_all` revoke tokens, so a fetch that
/// started before them completes for its waiters without storing.
#[derive(Default)]
struct State {
    entries: HashMap<String, CacheEntry>,
    fetches: HashMap<String, u64>,
}

type StateRef = Arc<Mutex<State>>;

fn lock(state: &StateRef) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `key` falls under `prefix` when it equals it or continues it at a `:`
/// boundary, so `transactions:account:A` never covers `transactions:account:A1`.
fn covers(prefix: &str, key: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => prefix.ends_with(':') || rest.starts_with(':'),
        None => false,
    }
}

fn covered(prefixes: &[&str], key: &str) -> bool {
    prefixes.iter().any(|prefix| covers(prefix, key))
}

pub struct ResponseCache {
    state: StateRef,
    pending: Coalescer<String, Result<Erased, ApiError>>,
    next_fetch: AtomicU64,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            pending: Coalescer::new(),
            next_fetch: AtomicU64::new(0),
            default_ttl: default_ttl.max(MIN_TTL),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return the live entry for `key`, or join the fetch already in flight
    /// for it, or run `fetcher` and cache its non-empty result for `ttl`.
    ///
    /// Failures are not cached and reach every waiter. The pending marker is
    /// cleared whichever way the fetch ends. A fetch overtaken by an
    /// invalidation of its key still answers its waiters but stores nothing.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, ttl: Duration, fetcher: F) -> Result<T, ApiError>
    where
        T: CacheValue,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        if let Some(value) = self.get::<T>(key) {
            debug!(key = key, "Cache hit");
            return Ok(value);
        }

        let owned_key = key.to_string();
        if self.pending.is_in_flight(&owned_key) {
            debug!(key = key, "Joining in-flight fetch");
        }

        let state = Arc::clone(&self.state);
        let token = self.next_fetch.fetch_add(1, Ordering::Relaxed);
        let ttl = ttl.max(MIN_TTL);
        let store_key = owned_key.clone();

        let in_flight = self.pending.run(owned_key, move || {
            let call = fetcher();
            async move {
                lock(&state).fetches.insert(store_key.clone(), token);
                let result = call.await;
                let mut state = lock(&state);
                let current = state.fetches.get(&store_key) == Some(&token);
                if current {
                    state.fetches.remove(&store_key);
                }

                let value = result?;
                let empty = value.is_empty_result();
                let erased: Erased = Arc::new(value);
                if empty {
                    debug!(key = %store_key, "Not caching empty result");
                } else if !current {
                    debug!(key = %store_key, "Key invalidated during fetch, result not stored");
                } else {
                    state.entries.insert(
                        store_key,
                        CacheEntry {
                            value: Arc::clone(&erased),
                            expires_at: Instant::now() + ttl,
                        },
                    );
                }
                Ok(erased)
            }
        });

        let erased = in_flight.await?;
        downcast(key, &erased)
    }

    /// Live value for `key`. Expired entries are evicted here.
    pub fn get<T: CacheValue>(&self, key: &str) -> Option<T> {
        let mut state = lock(&self.state);
        let entry = state.entries.get(key)?;
        if Instant::now() >= entry.expires_at {
            debug!(key = key, "Cache entry expired");
            state.entries.remove(key);
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Whether a live entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        lock(&self.state)
            .entries
            .get(key)
            .is_some_and(|entry| Instant::now() < entry.expires_at)
    }

    /// Remove every entry under any of `prefixes`, and detach fetches in
    /// flight for those keys so later readers fetch again.
    pub fn invalidate(&self, prefixes: &[&str]) {
        let mut state = lock(&self.state);
        let before = state.entries.len();
        state.entries.retain(|key, _| !covered(prefixes, key));
        state.fetches.retain(|key, _| !covered(prefixes, key));
        self.pending.forget(|key| covered(prefixes, key));
        debug!(prefixes = ?prefixes, removed = before - state.entries.len(), "Cache invalidated");
    }

    /// Drop every entry and every pending marker.
    pub fn clear_all(&self) {
        let mut state = lock(&self.state);
        state.entries.clear();
        state.fetches.clear();
        self.pending.clear();
        debug!("Cache cleared");
    }

    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn downcast<T: CacheValue>(key: &str, erased: &Erased) -> Result<T, ApiError> {
    erased.downcast_ref::<T>().cloned().ok_or_else(|| {
        ApiError::InvalidResponse(format!("cached value for '{}' has an unexpected type", key))
    })
}
