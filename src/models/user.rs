use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authz::Role;

/// Account status as reported by the portal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
    Suspended,
}

/// The authenticated principal, as cached between logins.
///
/// Replaced wholesale by `set_current_user` / `clear_current_user`; the only
/// field mutated in place after creation is `custom_permissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
    pub authorized: bool,
    /// Ad-hoc permission strings ("resource" or "resource:action") layered on
    /// top of the role's static grants.
    #[serde(default)]
    pub custom_permissions: Vec<String>,
}

impl SessionUser {
    pub fn new(id: Uuid, email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            role,
            status: UserStatus::Active,
            authorized: true,
            custom_permissions: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_authorized(mut self, authorized: bool) -> Self {
        self.authorized = authorized;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Login/signup response: bearer token plus the resolved user and the
/// server-side expiry of the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}
