//! Authorization module - profile registry and permission evaluation
//!
//! Implements the portal's role model:
//! - Static per-role grant tables (resource + optional action + optional
//!   condition over the current user)
//! - Ad-hoc permission strings carried on the user itself
//! - Fail-closed evaluation: unknown roles and unevaluable conditions deny
//!
//! Wildcard rules, kept exactly as the portal behaves in production:
//! a grant without an action matches any requested action for its resource,
//! and a request without an action matches any grant for that resource, even
//! one that names a specific action.

mod evaluator;
mod grant;
mod registry;

pub use evaluator::{DefaultEvaluator, PermissionEvaluator};
pub use grant::{GrantCondition, PermissionGrant};
pub use registry::{ProfileRegistry, RoleProfile};

use serde::{Deserialize, Serialize};

/// Role identifiers recognized by the portal. Closed set: adding a role
/// means adding its grant table to [`ProfileRegistry::with_default_profiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Partner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Partner => "partner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "manager" => Ok(Role::Manager),
            "partner" => Ok(Role::Partner),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Well-known resource names
pub mod resources {
    pub const DASHBOARD: &str = "dashboard";
    pub const SOLICITATIONS: &str = "solicitations";
    pub const PIPELINE: &str = "pipeline";
    pub const DOCUMENTS: &str = "documents";
    pub const MESSAGES: &str = "messages";
    pub const REPORTS: &str = "reports";
    pub const PARTNERS: &str = "partners";
    pub const USERS: &str = "users";
}

/// Well-known action names
pub mod actions {
    pub const VIEW: &str = "view";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const APPROVE: &str = "approve";
    pub const EXPORT: &str = "export";
    pub const UPLOAD: &str = "upload";
    pub const SEND: &str = "send";
}
