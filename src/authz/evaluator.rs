use std::sync::Arc;

use crate::models::SessionUser;

use super::registry::ProfileRegistry;

/// Permission evaluator seam consumed by guards and conditional display
/// logic.
pub trait PermissionEvaluator: Send + Sync {
    /// Check if the user may perform `action` on `resource`.
    fn allows(&self, user: &SessionUser, resource: &str, action: Option<&str>) -> bool;
}

/// Default evaluator with the portal's standard logic
///
/// Evaluation order:
/// 1. ad-hoc permission strings on the user -> allow
/// 2. role grant table (conditions evaluated against the user) -> allow
/// 3. deny
#[derive(Clone)]
pub struct DefaultEvaluator {
    registry: Arc<ProfileRegistry>,
}

impl DefaultEvaluator {
    pub fn new(registry: Arc<ProfileRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Ad-hoc strings follow the same wildcard rules as stored grants:
    /// "resource" covers every action, and a request without an action
    /// matches any entry for the resource.
    fn custom_matches(entry: &str, resource: &str, action: Option<&str>) -> bool {
        let (entry_resource, entry_action) = match entry.split_once(':') {
            Some((r, a)) => (r, Some(a)),
            None => (entry, None),
        };

        if entry_resource != resource {
            return false;
        }

        match (action, entry_action) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(requested), Some(granted)) => requested == granted,
        }
    }
}

impl PermissionEvaluator for DefaultEvaluator {
    fn allows(&self, user: &SessionUser, resource: &str, action: Option<&str>) -> bool {
        // 1. Ad-hoc permissions layered on the user
        if user
            .custom_permissions
            .iter()
            .any(|entry| Self::custom_matches(entry, resource, action))
        {
            tracing::debug!(
                user_id = %user.id,
                resource,
                action = action.unwrap_or("*"),
                "custom permission match"
            );
            return true;
        }

        // 2. Role grant table
        if self.registry.has_permission(user.role, resource, action, Some(user)) {
            tracing::debug!(
                user_id = %user.id,
                role = %user.role,
                resource,
                action = action.unwrap_or("*"),
                "role grant match"
            );
            return true;
        }

        // 3. Deny
        tracing::debug!(
            user_id = %user.id,
            role = %user.role,
            resource,
            action = action.unwrap_or("*"),
            "permission denied"
        );
        false
    }
}
