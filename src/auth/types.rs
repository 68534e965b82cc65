use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{PermissionSet, Tenant};

/// Role name that bypasses every authorization check.
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub exp: i64,   // expiration timestamp
    pub iat: i64,   // issued at timestamp
}

/// How a user's role participates in authorization.
///
/// A super admin has no tenant and no permission list; everything else is
/// scoped to exactly one company/plant pair and its granted permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRole {
    SuperAdmin,
    Scoped { tenant: Tenant, grants: PermissionSet },
}

/// Snapshot of the caller, loaded once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    /// Role name as stored, kept for audit output only.
    pub role_name: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn super_admin(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            role_name: SUPER_ADMIN_ROLE.to_string(),
            role: UserRole::SuperAdmin,
        }
    }

    pub fn scoped(
        id: Uuid,
        email: impl Into<String>,
        role_name: impl Into<String>,
        tenant: Tenant,
        grants: PermissionSet,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            role_name: role_name.into(),
            role: UserRole::Scoped { tenant, grants },
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self.role, UserRole::SuperAdmin)
    }

    pub fn tenant(&self) -> Option<Tenant> {
        match &self.role {
            UserRole::SuperAdmin => None,
            UserRole::Scoped { tenant, .. } => Some(*tenant),
        }
    }

    pub fn grants(&self) -> Option<&PermissionSet> {
        match &self.role {
            UserRole::SuperAdmin => None,
            UserRole::Scoped { grants, .. } => Some(grants),
        }
    }
}
