//! Authentication module for managing credentials and their lifecycle.
//!
//! This module provides:
//! - `Credential`: bearer token with an expiry derived from its JWT claims
//! - `IdentityProvider`: the external session authority (get / refresh)
//! - `CredentialManager`: the single owner of the stored credential, with
//!   proactive background refresh and de-duplicated refresh attempts
//! - `GoTrueProvider`: a Supabase-compatible identity provider over HTTP
//!
//! Credentials are refreshed when less than 10 minutes remain, checked every
//! 5 minutes in the background while the timer is running.

pub mod credential;
pub mod gotrue;
pub mod identity;
pub mod manager;

pub use credential::{is_jwt_shaped, Credential};
pub use gotrue::GoTrueProvider;
pub use identity::{AuthError, IdentityProvider, NoIdentityProvider};
pub use manager::CredentialManager;
