//! Current-user state and the session facade.
//!
//! `SessionStore` is the single source of truth for "who is logged in",
//! synchronized with durable storage and observable through synchronous
//! subscriber callbacks. `SessionManager` wires it to the token store and
//! the auth API for the login / resolve / logout control flow.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::api::AuthApi;
use crate::errors::AppResult;
use crate::models::{AuthResponse, LoginRequest, SessionUser, SignupRequest};
use crate::preferences::Preferences;
use crate::storage::{keys, Storage};
use crate::token::TokenStore;

/// Handle returned by [`SessionStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type SessionCallback = Arc<dyn Fn(Option<&SessionUser>) + Send + Sync>;

pub struct SessionStore {
    storage: Arc<dyn Storage>,
    current: Mutex<Option<SessionUser>>,
    subscribers: Mutex<Vec<(SubscriptionId, SessionCallback)>>,
    next_subscription: AtomicU64,
}

impl SessionStore {
    /// Builds the store and restores any persisted user. A corrupt snapshot
    /// is logged with its serde path and deleted; the store comes up
    /// unauthenticated instead of failing.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let current = Self::restore(storage.as_ref());
        Self {
            storage,
            current: Mutex::new(current),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    fn restore(storage: &dyn Storage) -> Option<SessionUser> {
        let raw = storage.get(keys::CURRENT_USER)?;

        let mut deserializer = serde_json::Deserializer::from_str(&raw);
        match serde_path_to_error::deserialize::<_, SessionUser>(&mut deserializer) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(path = %err.path(), error = %err, "dropping corrupt persisted user");
                if let Err(err) = storage.remove(keys::CURRENT_USER) {
                    tracing::warn!(error = %err, "failed to delete corrupt user entry");
                }
                None
            }
        }
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.current.lock().expect("session lock poisoned").clone()
    }

    /// Replaces the current user, persists it, then notifies subscribers
    /// synchronously on this thread.
    pub fn set_current_user(&self, user: SessionUser) -> AppResult<()> {
        self.storage.set(keys::CURRENT_USER, &serde_json::to_string(&user)?)?;
        {
            let mut current = self.current.lock().expect("session lock poisoned");
            *current = Some(user);
        }
        self.notify();
        Ok(())
    }

    pub fn clear_current_user(&self) -> AppResult<()> {
        self.storage.remove(keys::CURRENT_USER)?;
        {
            let mut current = self.current.lock().expect("session lock poisoned");
            *current = None;
        }
        self.notify();
        Ok(())
    }

    /// Appends an ad-hoc permission string to the current user and persists
    /// the updated snapshot. No-op when logged out or when the entry is
    /// already present.
    pub fn add_custom_permission(&self, resource: &str, action: Option<&str>) -> AppResult<()> {
        let entry = custom_permission_entry(resource, action);
        let updated = {
            let mut current = self.current.lock().expect("session lock poisoned");
            match current.as_mut() {
                Some(user) if !user.custom_permissions.contains(&entry) => {
                    user.custom_permissions.push(entry);
                    Some(user.clone())
                }
                _ => None,
            }
        };

        self.persist_and_notify(updated)
    }

    /// Removes a previously added ad-hoc permission string. No-op when
    /// logged out or when the entry is absent.
    pub fn remove_custom_permission(&self, resource: &str, action: Option<&str>) -> AppResult<()> {
        let entry = custom_permission_entry(resource, action);
        let updated = {
            let mut current = self.current.lock().expect("session lock poisoned");
            match current.as_mut() {
                Some(user) if user.custom_permissions.contains(&entry) => {
                    user.custom_permissions.retain(|e| e != &entry);
                    Some(user.clone())
                }
                _ => None,
            }
        };

        self.persist_and_notify(updated)
    }

    fn persist_and_notify(&self, updated: Option<SessionUser>) -> AppResult<()> {
        let Some(user) = updated else {
            return Ok(());
        };
        self.storage.set(keys::CURRENT_USER, &serde_json::to_string(&user)?)?;
        self.notify();
        Ok(())
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Option<&SessionUser>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .expect("session lock poisoned")
            .push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers
            .lock()
            .expect("session lock poisoned")
            .retain(|(existing, _)| *existing != id);
    }

    fn notify(&self) {
        let current = self.current.lock().expect("session lock poisoned").clone();
        // Snapshot the callbacks and drop the lock before invoking them, so a
        // callback may subscribe or unsubscribe without deadlocking.
        let callbacks: Vec<SessionCallback> = self
            .subscribers
            .lock()
            .expect("session lock poisoned")
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback(current.as_ref());
        }
    }
}

fn custom_permission_entry(resource: &str, action: Option<&str>) -> String {
    match action {
        Some(action) => format!("{resource}:{action}"),
        None => resource.to_string(),
    }
}

/// Login / resolve / logout control flow over the token store, the user
/// store and the auth API.
pub struct SessionManager {
    tokens: TokenStore,
    users: Arc<SessionStore>,
    preferences: Preferences,
    api: Arc<dyn AuthApi>,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn Storage>, api: Arc<dyn AuthApi>) -> Self {
        Self {
            tokens: TokenStore::new(storage.clone()),
            users: Arc::new(SessionStore::new(storage.clone())),
            preferences: Preferences::new(storage),
            api,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn users(&self) -> &Arc<SessionStore> {
        &self.users
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    /// Authenticate and cache the session. Errors surface to the caller for
    /// display.
    pub async fn login(&self, email: impl Into<String>, password: impl Into<String>) -> AppResult<SessionUser> {
        let request = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        let response = self.api.login(&request).await?;
        self.store_session(response)
    }

    pub async fn signup(&self, request: &SignupRequest) -> AppResult<SessionUser> {
        let response = self.api.signup(request).await?;
        self.store_session(response)
    }

    fn store_session(&self, response: AuthResponse) -> AppResult<SessionUser> {
        self.tokens.set_token(&response.token)?;
        self.users.set_current_user(response.user.clone())?;
        self.preferences.set_last_sync(Utc::now())?;
        tracing::info!(user_id = %response.user.id, role = %response.user.role, "session established");
        Ok(response.user)
    }

    /// Resolve the current user for a live token.
    ///
    /// Refetches from the backend and refreshes the cache; a network failure
    /// degrades to the cached snapshot without touching the token, so a
    /// transient outage never forces re-authentication. The error only
    /// surfaces when there is no snapshot to fall back to.
    pub async fn resolve_user(&self) -> AppResult<Option<SessionUser>> {
        let Some(token) = self.tokens.token() else {
            return Ok(None);
        };
        if crate::token::is_token_expired(&token) {
            return Ok(None);
        }

        let cached = self.users.current_user();
        match self.api.fetch_current_user(&token).await {
            Ok(user) => {
                self.users.set_current_user(user.clone())?;
                self.preferences.set_last_sync(Utc::now())?;
                Ok(Some(user))
            }
            Err(err) => match cached {
                Some(user) => {
                    tracing::warn!(error = %err, "user refresh failed, falling back to cached snapshot");
                    Ok(Some(user))
                }
                None => Err(err),
            },
        }
    }

    /// Clears both the token and the user snapshot.
    pub fn logout(&self) -> AppResult<()> {
        self.tokens.remove_token()?;
        self.users.clear_current_user()?;
        tracing::info!("session cleared");
        Ok(())
    }
}
