//! Route/component guards: an ordered chain evaluated before navigation or
//! rendering, short-circuiting on the first denial.

use std::sync::Arc;

use crate::authz::{PermissionEvaluator, Role};
use crate::models::SessionUser;

/// What a guard sees: whether the session is live, and the cached user if
/// one is resolved.
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    pub authenticated: bool,
    pub user: Option<&'a SessionUser>,
}

impl<'a> GuardContext<'a> {
    pub fn new(authenticated: bool, user: Option<&'a SessionUser>) -> Self {
        Self { authenticated, user }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Deny { reason: String },
}

impl GuardDecision {
    pub fn deny(reason: impl Into<String>) -> Self {
        GuardDecision::Deny { reason: reason.into() }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

pub trait RouteGuard: Send + Sync {
    fn check(&self, ctx: &GuardContext<'_>) -> GuardDecision;
}

/// Requires a live (present, unexpired) session.
pub struct AuthGuard;

impl RouteGuard for AuthGuard {
    fn check(&self, ctx: &GuardContext<'_>) -> GuardDecision {
        if ctx.authenticated {
            GuardDecision::Allow
        } else {
            GuardDecision::deny("not authenticated")
        }
    }
}

/// Requires the current user's role to be in the allow-list.
pub struct RoleGuard {
    allowed: Vec<Role>,
}

impl RoleGuard {
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }
}

impl RouteGuard for RoleGuard {
    fn check(&self, ctx: &GuardContext<'_>) -> GuardDecision {
        match ctx.user {
            Some(user) if self.allowed.contains(&user.role) => GuardDecision::Allow,
            Some(user) => GuardDecision::deny(format!("role {} not allowed", user.role)),
            None => GuardDecision::deny("no resolved user"),
        }
    }
}

/// Delegates to a permission evaluator for one (resource, action) check.
pub struct PermissionGuard {
    evaluator: Arc<dyn PermissionEvaluator>,
    resource: String,
    action: Option<String>,
}

impl PermissionGuard {
    pub fn new(
        evaluator: Arc<dyn PermissionEvaluator>,
        resource: impl Into<String>,
        action: Option<&str>,
    ) -> Self {
        Self {
            evaluator,
            resource: resource.into(),
            action: action.map(str::to_string),
        }
    }
}

impl RouteGuard for PermissionGuard {
    fn check(&self, ctx: &GuardContext<'_>) -> GuardDecision {
        let Some(user) = ctx.user else {
            return GuardDecision::deny("no resolved user");
        };

        if self.evaluator.allows(user, &self.resource, self.action.as_deref()) {
            GuardDecision::Allow
        } else {
            GuardDecision::deny(format!(
                "missing permission {}",
                match &self.action {
                    Some(action) => format!("{}:{action}", self.resource),
                    None => self.resource.clone(),
                }
            ))
        }
    }
}

/// Ordered guard list. Evaluation stops at the first denial.
#[derive(Default)]
pub struct GuardChain {
    guards: Vec<Box<dyn RouteGuard>>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, guard: impl RouteGuard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    pub fn evaluate(&self, ctx: &GuardContext<'_>) -> GuardDecision {
        for guard in &self.guards {
            match guard.check(ctx) {
                GuardDecision::Allow => continue,
                deny => return deny,
            }
        }
        GuardDecision::Allow
    }
}

/// Conventional auth-then-role chain used by most routes.
pub fn require_profile(roles: impl IntoIterator<Item = Role>) -> GuardChain {
    GuardChain::new().with(AuthGuard).with(RoleGuard::new(roles))
}
