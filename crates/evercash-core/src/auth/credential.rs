use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// An opaque bearer token plus its expiry, when one can be derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: f64,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Build a credential from a raw token, reading `exp` from the JWT payload.
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let expires_at = decode_expiry(&token);
        Self { token, expires_at }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Three non-empty base64url segments separated by dots.
    pub fn is_jwt(&self) -> bool {
        is_jwt_shaped(&self.token)
    }

    /// Known to be expired. A credential without a derivable expiry is not.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Malformed, expiry unknown, or less than `threshold` remaining.
    pub fn needs_refresh(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        if !self.is_jwt() {
            return true;
        }
        match self.expires_at {
            Some(exp) => exp - now < threshold,
            None => true,
        }
    }

    /// Safe to put in an Authorization header right now.
    pub fn is_bearer_ready(&self, now: DateTime<Utc>) -> bool {
        self.is_jwt() && !self.is_expired(now)
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at
            .map(|exp| (exp - now).num_minutes().max(0))
    }
}

pub fn is_jwt_shaped(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    if !is_jwt_shaped(token) {
        return None;
    }
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp as i64, 0)
}
