use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::storage::{keys, Storage};

/// Claims the portal cares about. The payload may carry more; only `exp` is
/// required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry, seconds since epoch.
    pub exp: i64,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Decode the payload of a three-part dot-separated bearer token without
/// verifying its signature. The client never holds the signing secret; it
/// only needs the expiry claim.
pub fn decode_claims(token: &str) -> AppResult<Claims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(AppError::token("token is not a three-part dot-separated string"));
    };

    let raw = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| AppError::token(format!("payload is not base64url: {err}")))?;

    serde_json::from_slice(&raw).map_err(|err| AppError::token(format!("payload is not claims JSON: {err}")))
}

/// True when the token's `exp` has passed. Any decode failure counts as
/// expired; nothing propagates past this boundary.
pub fn is_token_expired(token: &str) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.exp <= Utc::now().timestamp(),
        Err(err) => {
            tracing::debug!(error = %err, "undecodable token treated as expired");
            true
        }
    }
}

/// Durable holder for the raw bearer string.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn set_token(&self, token: &str) -> AppResult<()> {
        self.storage.set(keys::TOKEN, token)
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(keys::TOKEN)
    }

    pub fn remove_token(&self) -> AppResult<()> {
        self.storage.remove(keys::TOKEN)
    }

    /// Token present and not expired. Says nothing about whether a user
    /// snapshot is resolvable; callers needing one go through the session.
    pub fn is_authenticated(&self) -> bool {
        self.token().map(|token| !is_token_expired(&token)).unwrap_or(false)
    }
}
