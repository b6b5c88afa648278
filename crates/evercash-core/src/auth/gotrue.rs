//! Supabase-compatible (GoTrue) identity provider.
//!
//! Sessions are persisted under [`AUTH_SESSION_KEY`] so a refresh token
//! survives restarts. All HTTP goes through the shared [`Transport`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{AuthError, Credential, IdentityProvider};
use crate::api::transport::{HttpRequest, Transport};
use crate::clock::Clock;
use crate::storage::{self, KeyValueStore, AUTH_SESSION_KEY};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    refresh_token: String,
    /// Unix seconds
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
}

pub struct GoTrueProvider {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    auth_url: String,
    anon_key: String,
}

impl GoTrueProvider {
    pub fn new(
        transport: Arc<dyn Transport>,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        auth_url: &str,
        anon_key: &str,
    ) -> Self {
        Self {
            transport,
            storage,
            clock,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    /// Email/password sign-in. Persists the new session.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        let body = json!({ "email": email, "password": password });
        let credential = self.token_request("password", body).await?;
        info!(email = email, "Signed in with password");
        Ok(credential)
    }

    fn load_session(&self) -> Option<StoredSession> {
        let raw = storage::read(self.storage.as_ref(), AUTH_SESSION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable auth session");
                None
            }
        }
    }

    fn save_session(&self, session: &StoredSession) {
        match serde_json::to_string(session) {
            Ok(raw) => {
                storage::write(self.storage.as_ref(), AUTH_SESSION_KEY, &raw);
            }
            Err(e) => warn!(error = %e, "Failed to serialize auth session"),
        }
    }

    fn credential_for(session: &StoredSession) -> Credential {
        let expires_at = session
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        let credential = Credential::from_token(session.access_token.clone());
        match credential.expires_at() {
            Some(_) => credential,
            None => Credential::new(session.access_token.clone(), expires_at),
        }
    }

    fn request(&self, method: Method, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
            .header("content-type", "application/json")
    }

    async fn token_request(&self, grant_type: &str, body: Value) -> Result<Credential, AuthError> {
        let request = self
            .request(Method::POST, &format!("/token?grant_type={}", grant_type))
            .json(body);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(AuthError::Rejected(rejection_message(&response.body)));
        }

        let token: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| AuthError::Rejected(format!("unreadable token response: {}", e)))?;

        let expires_at = token.expires_at.or_else(|| {
            token
                .expires_in
                .map(|secs| (self.clock.now() + Duration::seconds(secs)).timestamp())
        });
        let session = StoredSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
        };
        self.save_session(&session);
        Ok(Self::credential_for(&session))
    }
}

/// Pull a readable message out of a GoTrue error body.
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|field| v.get(field).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    async fn get_session(&self) -> Result<Option<Credential>, AuthError> {
        Ok(self.load_session().as_ref().map(Self::credential_for))
    }

    async fn refresh_session(&self) -> Result<Option<Credential>, AuthError> {
        let Some(session) = self.load_session() else {
            debug!("No stored session to refresh");
            return Ok(None);
        };
        let body = json!({ "refresh_token": session.refresh_token });
        self.token_request("refresh_token", body).await.map(Some)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.load_session();
        storage::remove(self.storage.as_ref(), AUTH_SESSION_KEY);

        if let Some(session) = session {
            let request = self
                .request(Method::POST, "/logout")
                .header("authorization", &format!("Bearer {}", session.access_token));
            let response = self.transport.send(request).await?;
            if !response.is_success() {
                warn!(status = response.status, "Provider logout was not accepted");
            }
        }
        Ok(())
    }
}
