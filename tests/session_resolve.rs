use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header};
use serde::Serialize;
use uuid::Uuid;

use acesse_core::api::AuthApi;
use acesse_core::errors::{AppError, AppResult};
use acesse_core::models::{AuthResponse, LoginRequest, SignupRequest};
use acesse_core::storage::{keys, MemoryStorage, Storage};
use acesse_core::{Role, SessionManager, SessionUser};

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    exp: i64,
}

fn issue_token(user_id: Uuid, exp_offset: Duration) -> String {
    let claims = TestClaims {
        sub: user_id.to_string(),
        exp: (Utc::now() + exp_offset).timestamp(),
    };
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret"))
        .expect("failed to encode test token")
}

/// Scripted backend: login always succeeds, fetch can be switched to fail to
/// simulate an outage.
struct ScriptedApi {
    user: SessionUser,
    fetch_fails: AtomicBool,
    fetch_calls: AtomicUsize,
}

impl ScriptedApi {
    fn new(user: SessionUser) -> Self {
        Self {
            user,
            fetch_fails: AtomicBool::new(false),
            fetch_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AuthApi for ScriptedApi {
    async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
        if request.password != "correct-horse" {
            return Err(AppError::unauthorized("invalid credentials"));
        }
        Ok(AuthResponse {
            token: issue_token(self.user.id, Duration::hours(24)),
            user: self.user.clone(),
            expires_at: Utc::now() + Duration::hours(24),
        })
    }

    async fn signup(&self, _request: &SignupRequest) -> AppResult<AuthResponse> {
        Ok(AuthResponse {
            token: issue_token(self.user.id, Duration::hours(24)),
            user: self.user.clone(),
            expires_at: Utc::now() + Duration::hours(24),
        })
    }

    async fn fetch_current_user(&self, _token: &str) -> AppResult<SessionUser> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fetch_fails.load(Ordering::SeqCst) {
            return Err(AppError::network("connection refused"));
        }
        Ok(self.user.clone())
    }
}

fn partner() -> SessionUser {
    SessionUser::new(Uuid::new_v4(), "paulo@acesse.com", "Paulo Parceiro", Role::Partner)
}

#[tokio::test]
async fn login_stores_token_user_and_last_sync() -> Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let api = Arc::new(ScriptedApi::new(partner()));
    let session = SessionManager::new(storage.clone(), api.clone());

    assert!(!session.is_authenticated());

    let user = session.login("paulo@acesse.com", "correct-horse").await?;
    assert_eq!(user.email, "paulo@acesse.com");
    assert!(session.is_authenticated());
    assert_eq!(session.users().current_user(), Some(user));
    assert!(session.preferences().last_sync().is_some());
    assert!(storage.get(keys::TOKEN).is_some());
    Ok(())
}

#[tokio::test]
async fn failed_login_surfaces_and_leaves_no_session() {
    let storage = Arc::new(MemoryStorage::new());
    let api = Arc::new(ScriptedApi::new(partner()));
    let session = SessionManager::new(storage, api);

    let err = session.login("paulo@acesse.com", "wrong").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert!(!session.is_authenticated());
    assert_eq!(session.users().current_user(), None);
}

#[tokio::test]
async fn resolve_refreshes_the_cached_user() -> Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let api = Arc::new(ScriptedApi::new(partner()));
    let session = SessionManager::new(storage, api.clone());

    session.login("paulo@acesse.com", "correct-horse").await?;
    let resolved = session.resolve_user().await?;
    assert!(resolved.is_some());
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn refresh_outage_falls_back_to_cache_and_keeps_token() -> Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let api = Arc::new(ScriptedApi::new(partner()));
    let session = SessionManager::new(storage.clone(), api.clone());

    session.login("paulo@acesse.com", "correct-horse").await?;
    api.fetch_fails.store(true, Ordering::SeqCst);

    let resolved = session.resolve_user().await?;
    assert_eq!(resolved.map(|u| u.email), Some("paulo@acesse.com".to_string()));

    // The outage must not degrade the session itself.
    assert!(session.is_authenticated());
    assert!(storage.get(keys::TOKEN).is_some());
    Ok(())
}

#[tokio::test]
async fn refresh_outage_without_cache_surfaces_but_keeps_token() -> Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let user = partner();
    storage.set(keys::TOKEN, &issue_token(user.id, Duration::hours(1)))?;

    let api = Arc::new(ScriptedApi::new(user));
    api.fetch_fails.store(true, Ordering::SeqCst);
    let session = SessionManager::new(storage.clone(), api);

    // Valid token, no snapshot to fall back to: the failure surfaces.
    assert!(session.resolve_user().await.is_err());
    assert!(storage.get(keys::TOKEN).is_some());
    Ok(())
}

#[tokio::test]
async fn resolve_is_none_for_missing_or_expired_token() -> Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let user = partner();
    let api = Arc::new(ScriptedApi::new(user.clone()));
    let session = SessionManager::new(storage.clone(), api.clone());

    assert_eq!(session.resolve_user().await?, None);

    storage.set(keys::TOKEN, &issue_token(user.id, Duration::hours(-1)))?;
    assert_eq!(session.resolve_user().await?, None);
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn logout_clears_token_and_user() -> Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let api = Arc::new(ScriptedApi::new(partner()));
    let session = SessionManager::new(storage.clone(), api);

    session.login("paulo@acesse.com", "correct-horse").await?;
    session.logout()?;

    assert!(!session.is_authenticated());
    assert_eq!(session.users().current_user(), None);
    assert_eq!(storage.get(keys::TOKEN), None);
    assert_eq!(storage.get(keys::CURRENT_USER), None);
    Ok(())
}
