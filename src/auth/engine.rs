//! The authorization decision procedure.
//!
//! Order is fixed: missing user fails first, then the super admin bypass, then
//! the per-action rules. Every decision is sent to the audit log.

use crate::auth::{
    audit, AccessError, Action, AuthenticatedUser, Decision, DeletePolicy, DenyReason, Grant,
    PermissionSet, ResourceRef, Tenant, UserRole,
};

/// Stateless evaluator; each call is a pure function of its arguments apart from logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationEngine;

impl AuthorizationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `user` may perform `action`, optionally on `resource`.
    ///
    /// A missing user is an error, not a denial.
    pub fn can_perform(
        &self,
        user: Option<&AuthenticatedUser>,
        action: Action<'_>,
        resource: Option<&ResourceRef>,
    ) -> Result<Decision, AccessError> {
        let Some(user) = user else {
            audit::unauthenticated(action, resource);
            return Err(AccessError::Unauthenticated);
        };

        let decision = evaluate(user, action, resource);
        audit::record(user, action, resource, &decision);
        Ok(decision)
    }

    pub fn has_module_access(
        &self,
        user: Option<&AuthenticatedUser>,
        module: &str,
    ) -> Result<Decision, AccessError> {
        self.can_perform(user, Action::Module(module), None)
    }

    pub fn has_permission(
        &self,
        user: Option<&AuthenticatedUser>,
        permission: &str,
    ) -> Result<Decision, AccessError> {
        self.can_perform(user, Action::Permission(permission), None)
    }

    /// Like [`can_perform`](Self::can_perform) but turns a denial into `Forbidden`.
    pub fn authorize(
        &self,
        user: Option<&AuthenticatedUser>,
        action: Action<'_>,
        resource: Option<&ResourceRef>,
    ) -> Result<(), AccessError> {
        self.can_perform(user, action, resource)?.into_result()
    }
}

fn evaluate(user: &AuthenticatedUser, action: Action<'_>, resource: Option<&ResourceRef>) -> Decision {
    let (tenant, grants) = match &user.role {
        UserRole::SuperAdmin => return Decision::Allowed(Grant::SuperAdmin),
        UserRole::Scoped { tenant, grants } => (tenant, grants),
    };

    match action {
        // Collection-level: restriction happens per record instead.
        Action::ViewAny | Action::Create => Decision::Allowed(Grant::Authenticated),
        Action::View | Action::Update | Action::Restore | Action::ForceDelete => {
            tenant_rule(tenant, resource)
        }
        Action::Delete => match resource {
            None => Decision::Denied(DenyReason::MissingResource),
            Some(record) => match record.kind.delete_policy() {
                DeletePolicy::Never => Decision::Denied(DenyReason::Immutable(record.kind)),
                DeletePolicy::TenantScoped => tenant_rule(tenant, resource),
            },
        },
        Action::Module(module) => module_rule(grants, module),
        Action::Permission(permission) => permission_rule(grants, permission),
    }
}

fn tenant_rule(tenant: &Tenant, resource: Option<&ResourceRef>) -> Decision {
    match resource {
        None => Decision::Denied(DenyReason::MissingResource),
        Some(record) if tenant.owns(record) => Decision::Allowed(Grant::TenantMatch),
        Some(_) => Decision::Denied(DenyReason::TenantMismatch),
    }
}

fn module_rule(grants: &PermissionSet, module: &str) -> Decision {
    if grants.has_module(module) {
        Decision::Allowed(Grant::ModuleAccess)
    } else {
        Decision::Denied(DenyReason::NoModuleAccess(module.to_string()))
    }
}

fn permission_rule(grants: &PermissionSet, permission: &str) -> Decision {
    if grants.contains(permission) {
        Decision::Allowed(Grant::Permission)
    } else {
        Decision::Denied(DenyReason::MissingPermission(permission.to_string()))
    }
}
