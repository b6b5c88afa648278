use async_trait::async_trait;
use thiserror::Error;

use super::Credential;
use crate::api::ApiError;

#[derive(Error, Debug, Clone)]
pub enum AuthError {
    #[error("Identity provider is not configured")]
    NotConfigured,

    #[error("Session rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Transport(#[from] ApiError),
}

/// The external session authority.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The current session's credential, without side effects.
    async fn get_session(&self) -> Result<Option<Credential>, AuthError>;

    /// Rotate the session. `Ok(None)` when there is no session to refresh.
    async fn refresh_session(&self) -> Result<Option<Credential>, AuthError>;

    /// End the session with the provider.
    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Used when no identity provider is configured (e.g. demo-only setups).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIdentityProvider;

#[async_trait]
impl IdentityProvider for NoIdentityProvider {
    async fn get_session(&self) -> Result<Option<Credential>, AuthError> {
        Ok(None)
    }

    async fn refresh_session(&self) -> Result<Option<Credential>, AuthError> {
        Err(AuthError::NotConfigured)
    }
}
