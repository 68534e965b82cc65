use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{AccessError, AuthenticatedUser, DenyReason, Tenant, SUPER_ADMIN_ROLE};
use crate::entities::{prelude::*, role, role_permission, user};

/// Permissions held by a user, indexed by name and by module.
///
/// Built once when the user snapshot is loaded so each check is a hash lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    names: HashSet<String>,
    modules: HashMap<String, HashSet<String>>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, module: impl Into<String>) {
        let name = name.into();
        self.modules
            .entry(module.into())
            .or_default()
            .insert(name.clone());
        self.names.insert(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|names| !names.is_empty())
    }

    /// Sorted permission names, for display.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().cloned().collect();
        names.sort();
        names
    }

    /// Sorted module names, for display.
    pub fn modules(&self) -> Vec<String> {
        let mut modules: Vec<String> = self.modules.keys().cloned().collect();
        modules.sort();
        modules
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<N: Into<String>, M: Into<String>> FromIterator<(N, M)> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = (N, M)>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        for (name, module) in iter {
            set.insert(name, module);
        }
        set
    }
}

/// Reads roles, permissions and tenancy from the database to build user snapshots.
#[derive(Clone)]
pub struct PermissionService {
    db: DatabaseConnection,
}

impl PermissionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Load the snapshot for a user id taken from a verified token.
    ///
    /// Returns `Ok(None)` for unknown or deactivated accounts so the caller is
    /// treated as anonymous.
    pub async fn load_user(&self, user_id: Uuid) -> Result<Option<AuthenticatedUser>, AccessError> {
        let Some((user_model, role_opt)) = User::find_by_id(user_id)
            .find_also_related(Role)
            .one(&self.db)
            .await?
        else {
            debug!(%user_id, "token subject no longer exists");
            return Ok(None);
        };

        if !user_model.is_active {
            debug!(%user_id, "token subject is deactivated");
            return Ok(None);
        }

        let grants = match &role_opt {
            Some(role) if role.is_active => self.role_permissions(role.id).await?,
            _ => PermissionSet::new(),
        };

        build_user(user_model, role_opt, grants).map(Some)
    }

    /// Active permissions granted to a role.
    pub async fn role_permissions(&self, role_id: Uuid) -> Result<PermissionSet, DbErr> {
        let rows = RolePermission::find()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .find_also_related(Permission)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, permission)| permission)
            .filter(|permission| permission.is_active)
            .map(|permission| (permission.name, permission.module))
            .collect())
    }
}

/// Assemble a snapshot from already-loaded rows, enforcing the tenancy invariants.
///
/// Only an active `super_admin` role gets the bypass. Every other user must have
/// both a company and a plant; a half-assigned account is refused outright.
pub fn build_user(
    user_model: user::Model,
    role_model: Option<role::Model>,
    grants: PermissionSet,
) -> Result<AuthenticatedUser, AccessError> {
    let role_name = role_model
        .as_ref()
        .map(|role| role.name.clone())
        .unwrap_or_default();
    let is_super_admin = role_model
        .as_ref()
        .is_some_and(|role| role.is_active && role.name == SUPER_ADMIN_ROLE);

    if is_super_admin {
        if user_model.company_id.is_some() || user_model.plant_id.is_some() {
            warn!(user_id = %user_model.id, "super admin account carries tenancy ids; ignoring them");
        }
        return Ok(AuthenticatedUser::super_admin(user_model.id, user_model.email));
    }

    match (user_model.company_id, user_model.plant_id) {
        (Some(company_id), Some(plant_id)) => Ok(AuthenticatedUser::scoped(
            user_model.id,
            user_model.email,
            role_name,
            Tenant::new(company_id, plant_id),
            grants,
        )),
        _ => {
            warn!(
                user_id = %user_model.id,
                role = %role_name,
                company_id = ?user_model.company_id,
                plant_id = ?user_model.plant_id,
                "non super admin account without full tenancy"
            );
            Err(AccessError::Forbidden(DenyReason::MissingTenant))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_row(company_id: Option<Uuid>, plant_id: Option<Uuid>) -> user::Model {
        user::Model {
            id: Uuid::from_u128(7),
            email: "nurse@clinic.test".to_string(),
            password_hash: String::new(),
            name: "Nurse".to_string(),
            role_id: Uuid::from_u128(100),
            company_id,
            plant_id,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn role_row(name: &str, is_active: bool) -> role::Model {
        role::Model {
            id: Uuid::from_u128(100),
            name: name.to_string(),
            description: None,
            is_active,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_permission_set_indexes_modules() {
        let set: PermissionSet = [
            ("lab_master.create", "laboratorium"),
            ("lab_master.update", "laboratorium"),
            ("inventory_item.view", "inventory"),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 3);
        assert!(set.contains("lab_master.update"));
        assert!(!set.contains("lab_master.delete"));
        assert!(set.has_module("laboratorium"));
        assert!(set.has_module("inventory"));
        assert!(!set.has_module("outpatient"));
        assert_eq!(set.modules(), vec!["inventory", "laboratorium"]);
    }

    #[test]
    fn test_empty_permission_set_has_no_modules() {
        let set = PermissionSet::new();
        assert!(set.is_empty());
        assert!(!set.has_module(""));
    }

    #[test]
    fn test_build_super_admin_ignores_grants() {
        let user = build_user(user_row(None, None), Some(role_row("super_admin", true)), PermissionSet::new())
            .unwrap();
        assert!(user.is_super_admin());
        assert_eq!(user.tenant(), None);
    }

    #[test]
    fn test_build_scoped_user() {
        let company = Uuid::from_u128(1);
        let plant = Uuid::from_u128(2);
        let grants: PermissionSet = [("lab_master.update", "laboratorium")].into_iter().collect();

        let user = build_user(user_row(Some(company), Some(plant)), Some(role_row("user", true)), grants)
            .unwrap();

        assert!(!user.is_super_admin());
        assert_eq!(user.role_name, "user");
        assert_eq!(user.tenant(), Some(Tenant::new(company, plant)));
        assert!(user.grants().is_some_and(|g| g.contains("lab_master.update")));
    }

    #[test]
    fn test_build_rejects_partial_tenancy() {
        let err = build_user(
            user_row(Some(Uuid::from_u128(1)), None),
            Some(role_row("user", true)),
            PermissionSet::new(),
        )
        .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(DenyReason::MissingTenant)));
    }

    #[test]
    fn test_inactive_super_admin_role_gets_no_bypass() {
        let err = build_user(user_row(None, None), Some(role_row("super_admin", false)), PermissionSet::new())
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(DenyReason::MissingTenant)));
    }

    #[test]
    fn test_similar_role_name_is_not_super_admin() {
        let user = build_user(
            user_row(Some(Uuid::from_u128(1)), Some(Uuid::from_u128(1))),
            Some(role_row("Super_Admin", true)),
            PermissionSet::new(),
        )
        .unwrap();
        assert!(!user.is_super_admin());
    }
}
