//! Durable client-side key-value storage.
//!
//! This module provides:
//! - `KeyValueStore`: the injected get/set/delete capability
//! - `MemoryStore`: process-local map, used for tests and embedding
//! - `FileStore`: a single JSON file under the data directory
//! - `KeyringStore`: OS-level secret storage via keyring
//!
//! Every caller in the core goes through the best-effort helpers below:
//! storage failures are logged and swallowed, never surfaced.

pub mod file;
pub mod keychain;
pub mod memory;

pub use self::file::FileStore;
pub use self::keychain::KeyringStore;
pub use self::memory::MemoryStore;

use anyhow::Result;
use tracing::warn;

/// Storage key holding the current access token.
pub const CREDENTIAL_KEY: &str = "evercash_access_token";

/// Storage key holding the demo-mode flag (`"true"` / `"false"`).
pub const DEMO_MODE_KEY: &str = "evercash_demo_mode";

/// Storage key set to `"true"` once the user has been offered demo mode.
pub const DEMO_SEEN_KEY: &str = "evercash_demo_seen";

/// Storage key holding the serialized demo overlay dataset.
pub const OVERLAY_DATA_KEY: &str = "evercash_demo_overlay_data_v1";

/// Storage key holding the identity provider session (refresh token).
pub const AUTH_SESSION_KEY: &str = "evercash_auth_session";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Read a key, treating any storage failure as "absent".
pub fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key = key, error = %e, "Storage read failed");
            None
        }
    }
}

/// Write a key, logging (not propagating) failures.
pub fn write(store: &dyn KeyValueStore, key: &str, value: &str) -> bool {
    match store.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            warn!(key = key, error = %e, "Storage write failed");
            false
        }
    }
}

/// Remove a key, logging (not propagating) failures.
pub fn remove(store: &dyn KeyValueStore, key: &str) -> bool {
    match store.delete(key) {
        Ok(()) => true,
        Err(e) => {
            warn!(key = key, error = %e, "Storage delete failed");
            false
        }
    }
}
