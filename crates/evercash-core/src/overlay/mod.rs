//! Demo mode: a local, deterministic stand-in for the remote backend.
//!
//! - `OverlayDataset`: seeded accounts, categories and ~two months of
//!   transactions, persisted under `evercash_demo_overlay_data_v1`
//! - `OverlayClient`: a `BudgetApi` answering reads from the dataset and
//!   rejecting every mutation with `ApiError::DemoModeBlocked`
//! - `seed`: sample accounts and transactions written to the real backend,
//!   and their removal
//! - `is_enabled` / `set_enabled`: the persisted demo-mode flag
//! - `has_seen_demo` and friends: whether a new user was already offered
//!   demo mode

pub mod client;
pub mod dataset;
pub mod seed;

pub use client::OverlayClient;
pub use dataset::OverlayDataset;
pub use seed::{clear_demo_data, seed_demo_data, Cleanup, SeedStats};

use crate::storage::{self, KeyValueStore, DEMO_MODE_KEY, DEMO_SEEN_KEY};

/// Whether demo mode is switched on. Unreadable storage means off.
pub fn is_enabled(store: &dyn KeyValueStore) -> bool {
    storage::read(store, DEMO_MODE_KEY).as_deref() == Some("true")
}

/// Persist the demo-mode flag. Returns false when storage rejected it.
pub fn set_enabled(store: &dyn KeyValueStore, enabled: bool) -> bool {
    storage::write(store, DEMO_MODE_KEY, if enabled { "true" } else { "false" })
}

pub fn has_seen_demo(store: &dyn KeyValueStore) -> bool {
    storage::read(store, DEMO_SEEN_KEY).as_deref() == Some("true")
}

pub fn mark_demo_seen(store: &dyn KeyValueStore) -> bool {
    storage::write(store, DEMO_SEEN_KEY, "true")
}

/// Forget that demo mode was offered, so the next sign-in offers it again.
pub fn reset_demo_seen(store: &dyn KeyValueStore) -> bool {
    storage::remove(store, DEMO_SEEN_KEY)
}

/// Offer demo mode to a signed-in user who has not seen it and has not
/// finished onboarding.
pub fn should_show_demo_for_new_user(store: &dyn KeyValueStore, authenticated: bool, onboarding_completed: bool) -> bool {
    if !authenticated || has_seen_demo(store) {
        return false;
    }
    !onboarding_completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::UnavailableStore;

    #[test]
    fn test_flag_round_trip() {
        let store = MemoryStore::new();
        assert!(!is_enabled(&store));

        assert!(set_enabled(&store, true));
        assert!(is_enabled(&store));

        set_enabled(&store, false);
        assert!(!is_enabled(&store));
        assert_eq!(storage::read(&store, DEMO_MODE_KEY).as_deref(), Some("false"));
    }

    #[test]
    fn test_flag_with_unavailable_storage() {
        assert!(!set_enabled(&UnavailableStore, true));
        assert!(!is_enabled(&UnavailableStore));
    }

    #[test]
    fn test_new_user_is_offered_demo_once() {
        let store = MemoryStore::new();
        assert!(should_show_demo_for_new_user(&store, true, false));

        assert!(mark_demo_seen(&store));
        assert!(has_seen_demo(&store));
        assert!(!should_show_demo_for_new_user(&store, true, false));

        assert!(reset_demo_seen(&store));
        assert!(!has_seen_demo(&store));
        assert!(should_show_demo_for_new_user(&store, true, false));
    }

    #[test]
    fn test_demo_not_offered_when_signed_out_or_onboarded() {
        let store = MemoryStore::new();
        assert!(!should_show_demo_for_new_user(&store, false, false));
        assert!(!should_show_demo_for_new_user(&store, true, true));
        assert!(!has_seen_demo(&store));
    }

    #[test]
    fn test_seen_flag_ignores_other_values() {
        let store = MemoryStore::new();
        storage::write(&store, DEMO_SEEN_KEY, "yes");
        assert!(!has_seen_demo(&store));
        // Unavailable storage never marks the demo as seen
        assert!(!mark_demo_seen(&UnavailableStore));
        assert!(should_show_demo_for_new_user(&UnavailableStore, true, false));
    }
}
