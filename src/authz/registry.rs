use crate::models::SessionUser;

use super::grant::PermissionGrant;
use super::{actions, resources, Role};

/// A role plus its static grant table. Insertion order of grants is kept for
/// display; evaluation does not depend on it.
#[derive(Debug, Clone)]
pub struct RoleProfile {
    pub role: Role,
    pub description: String,
    pub grants: Vec<PermissionGrant>,
}

impl RoleProfile {
    pub fn new(role: Role, description: impl Into<String>, grants: Vec<PermissionGrant>) -> Self {
        Self {
            role,
            description: description.into(),
            grants,
        }
    }
}

/// Static role -> grants mapping, built once at startup.
///
/// Every query fails closed: a role with no registered profile gets no
/// permissions at all.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<RoleProfile>,
}

impl ProfileRegistry {
    /// Empty registry; every check denies. Useful for tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the portal's stock Manager and Partner
    /// profiles.
    pub fn with_default_profiles() -> Self {
        let manager = RoleProfile::new(
            Role::Manager,
            "Back-office manager: full pipeline and reporting access",
            vec![
                PermissionGrant::action(resources::DASHBOARD, actions::VIEW),
                // Wildcard: managers do everything on solicitations.
                PermissionGrant::resource(resources::SOLICITATIONS),
                PermissionGrant::action(resources::PIPELINE, actions::VIEW),
                PermissionGrant::action(resources::PIPELINE, actions::UPDATE),
                PermissionGrant::resource(resources::DOCUMENTS),
                PermissionGrant::action(resources::MESSAGES, actions::VIEW),
                PermissionGrant::action(resources::MESSAGES, actions::SEND),
                PermissionGrant::action(resources::REPORTS, actions::VIEW),
                PermissionGrant::action(resources::REPORTS, actions::EXPORT),
                PermissionGrant::action(resources::PARTNERS, actions::VIEW),
                PermissionGrant::action(resources::PARTNERS, actions::UPDATE),
                PermissionGrant::action(resources::USERS, actions::VIEW),
                PermissionGrant::action(resources::USERS, actions::UPDATE),
            ],
        );

        let partner = RoleProfile::new(
            Role::Partner,
            "External partner: submits and tracks own solicitations",
            vec![
                PermissionGrant::action(resources::DASHBOARD, actions::VIEW),
                PermissionGrant::action(resources::SOLICITATIONS, actions::VIEW),
                // Only authorized, active partners may open new solicitations.
                PermissionGrant::action(resources::SOLICITATIONS, actions::CREATE)
                    .with_condition(|user| user.authorized && user.is_active()),
                PermissionGrant::action(resources::PIPELINE, actions::VIEW),
                PermissionGrant::action(resources::DOCUMENTS, actions::VIEW),
                PermissionGrant::action(resources::DOCUMENTS, actions::UPLOAD),
                PermissionGrant::action(resources::MESSAGES, actions::VIEW),
                PermissionGrant::action(resources::MESSAGES, actions::SEND),
                PermissionGrant::action(resources::REPORTS, actions::VIEW),
            ],
        );

        Self {
            profiles: vec![manager, partner],
        }
    }

    pub fn register(&mut self, profile: RoleProfile) {
        self.profiles.push(profile);
    }

    pub fn profile(&self, role: Role) -> Option<&RoleProfile> {
        self.profiles.iter().find(|p| p.role == role)
    }

    /// True iff `role` has a grant covering (resource, action) whose
    /// condition, if any, passes for `user`.
    pub fn has_permission(
        &self,
        role: Role,
        resource: &str,
        action: Option<&str>,
        user: Option<&SessionUser>,
    ) -> bool {
        let Some(profile) = self.profile(role) else {
            tracing::debug!(role = %role, resource, "no profile registered, denying");
            return false;
        };

        profile
            .grants
            .iter()
            .any(|grant| grant.allows(resource, action, user))
    }

    /// Logical OR over the checks; short-circuits. Empty list is false.
    pub fn has_any_permission(
        &self,
        role: Role,
        checks: &[(&str, Option<&str>)],
        user: Option<&SessionUser>,
    ) -> bool {
        checks
            .iter()
            .any(|(resource, action)| self.has_permission(role, resource, *action, user))
    }

    /// Logical AND over the checks. Empty list is vacuously true.
    pub fn has_all_permissions(
        &self,
        role: Role,
        checks: &[(&str, Option<&str>)],
        user: Option<&SessionUser>,
    ) -> bool {
        checks
            .iter()
            .all(|(resource, action)| self.has_permission(role, resource, *action, user))
    }

    /// Grant table rendered as "resource:action" strings, in insertion order.
    /// Empty for an unregistered role.
    pub fn permissions_for_role(&self, role: Role) -> Vec<String> {
        self.profile(role)
            .map(|profile| profile.grants.iter().map(|g| g.display()).collect())
            .unwrap_or_default()
    }
}
