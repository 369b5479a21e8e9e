use std::sync::Arc;

use crate::models::SessionUser;

/// Optional side-effect-free predicate over the current user, evaluated when
/// the grant's resource/action already match.
pub type GrantCondition = Arc<dyn Fn(&SessionUser) -> bool + Send + Sync>;

/// A single permission record in a role's grant table.
///
/// `action: None` is a grant-level wildcard: it covers every action on the
/// resource.
#[derive(Clone)]
pub struct PermissionGrant {
    pub resource: String,
    pub action: Option<String>,
    pub condition: Option<GrantCondition>,
}

impl PermissionGrant {
    /// Wildcard grant for every action on `resource`.
    pub fn resource(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: None,
            condition: None,
        }
    }

    /// Grant for one specific action on `resource`.
    pub fn action(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: Some(action.into()),
            condition: None,
        }
    }

    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&SessionUser) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Resource/action match, ignoring the condition.
    ///
    /// A request without an action matches any grant for the resource; a
    /// grant without an action matches any requested action.
    pub fn matches(&self, resource: &str, action: Option<&str>) -> bool {
        if self.resource != resource {
            return false;
        }

        match (action, &self.action) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(requested), Some(granted)) => requested == granted,
        }
    }

    /// Full check: resource/action match plus the condition, evaluated
    /// against `user`. A condition with no user to evaluate against denies.
    pub fn allows(&self, resource: &str, action: Option<&str>, user: Option<&SessionUser>) -> bool {
        if !self.matches(resource, action) {
            return false;
        }

        match &self.condition {
            None => true,
            Some(condition) => user.map(|u| condition(u)).unwrap_or(false),
        }
    }

    /// Display form: "resource:action", or the bare resource for wildcards.
    pub fn display(&self) -> String {
        match &self.action {
            Some(action) => format!("{}:{}", self.resource, action),
            None => self.resource.clone(),
        }
    }
}

impl std::fmt::Debug for PermissionGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGrant")
            .field("resource", &self.resource)
            .field("action", &self.action)
            .field("condition", &self.condition.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::Role;
    use crate::models::{SessionUser, UserStatus};
    use uuid::Uuid;

    fn user() -> SessionUser {
        SessionUser::new(Uuid::new_v4(), "p@acesse.com", "Partner", Role::Partner)
    }

    #[test]
    fn wildcard_grant_matches_any_action() {
        let grant = PermissionGrant::resource("documents");
        assert!(grant.matches("documents", Some("upload")));
        assert!(grant.matches("documents", Some("delete")));
        assert!(grant.matches("documents", None));
        assert!(!grant.matches("reports", Some("upload")));
    }

    #[test]
    fn omitted_action_matches_specific_grant() {
        let grant = PermissionGrant::action("reports", "export");
        assert!(grant.matches("reports", None));
        assert!(grant.matches("reports", Some("export")));
        assert!(!grant.matches("reports", Some("delete")));
    }

    #[test]
    fn condition_denies_without_user() {
        let grant = PermissionGrant::action("solicitations", "create").with_condition(|u| u.authorized);

        assert!(!grant.allows("solicitations", Some("create"), None));
        assert!(grant.allows("solicitations", Some("create"), Some(&user())));

        let unauthorized = user().with_authorized(false);
        assert!(!grant.allows("solicitations", Some("create"), Some(&unauthorized)));
    }

    #[test]
    fn condition_sees_user_status() {
        let grant = PermissionGrant::action("solicitations", "create")
            .with_condition(|u| u.authorized && u.is_active());

        let suspended = user().with_status(UserStatus::Suspended);
        assert!(!grant.allows("solicitations", Some("create"), Some(&suspended)));
    }

    #[test]
    fn display_renders_resource_action_pairs() {
        assert_eq!(PermissionGrant::action("reports", "export").display(), "reports:export");
        assert_eq!(PermissionGrant::resource("dashboard").display(), "dashboard");
    }
}
