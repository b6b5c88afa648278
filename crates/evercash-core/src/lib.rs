//! Evercash core: the authenticated, cached, fault-tolerant access layer
//! for the Evercash budgeting API.
//!
//! - `auth`: credential lifecycle (`CredentialManager`, GoTrue identity provider)
//! - `api`: request layer and the `BudgetApi` operation set (`RealClient`)
//! - `cache`: TTL response cache with request coalescing
//! - `overlay`: demo mode backed by a local deterministic dataset
//! - `session`: `SessionController`, which hands out the active backend
//! - `storage`, `config`, `models`, `notify`, `clock`, `utils`

pub mod api;
pub mod auth;
pub mod cache;
pub mod clock;
pub mod coalesce;
pub mod config;
pub mod models;
pub mod notify;
pub mod overlay;
pub mod session;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod testing;

pub use api::{ApiError, BudgetApi, RealClient, RequestClient, ReqwestTransport, Transport};
pub use auth::{AuthError, Credential, CredentialManager, GoTrueProvider, IdentityProvider, NoIdentityProvider};
pub use cache::ResponseCache;
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use notify::{DemoNotice, Notifier, TracingNotifier};
pub use overlay::{OverlayClient, OverlayDataset};
pub use session::{SessionController, SessionOptions, SessionState};
pub use storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore};
