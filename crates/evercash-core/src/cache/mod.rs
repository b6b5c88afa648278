//! In-memory response caching.
//!
//! This module provides the `ResponseCache` used by the real client:
//! entries expire after a per-call TTL (default 3 minutes), concurrent
//! misses for the same key are coalesced into one fetch, and mutating
//! operations invalidate entries by key prefix. A prefix covers a key it
//! equals or continues at a `:` boundary.
//!
//! Key layout (category, then optional scope):
//! - `accounts`, `categories`, `payees`, `goals`
//! - `transactions:all`, `transactions:account:<id>`
//! - `budget:<month>`, `budgetmonth:<month>`
//! - `report:<kind>:<start>:<end>`

pub mod response_cache;

pub use response_cache::{CacheValue, ResponseCache};

/// Cache keys shared by the real client and its invalidation rules.
pub mod keys {
    pub const ACCOUNTS: &str = "accounts";
    pub const CATEGORIES: &str = "categories";
    pub const PAYEES: &str = "payees";
    pub const GOALS: &str = "goals";
    pub const TRANSACTIONS_ALL: &str = "transactions:all";
    /// Prefix of every per-account transaction key.
    pub const TRANSACTIONS_BY_ACCOUNT: &str = "transactions:account:";
    /// Prefix of every report key. Reports are derived from transactions.
    pub const REPORTS: &str = "report:";

    pub fn transactions(account_id: Option<&str>) -> String {
        match account_id {
            Some(id) => format!("{}{}", TRANSACTIONS_BY_ACCOUNT, id),
            None => TRANSACTIONS_ALL.to_string(),
        }
    }

    pub fn budget_amounts(month: &str) -> String {
        format!("budget:{}", month)
    }

    pub fn budget_month(month: &str) -> String {
        format!("budgetmonth:{}", month)
    }

    pub fn report(kind: &str, start: Option<&str>, end: Option<&str>) -> String {
        format!("{}{}:{}:{}", REPORTS, kind, start.unwrap_or(""), end.unwrap_or(""))
    }
}
