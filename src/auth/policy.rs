//! Actions, per-resource policies and the decision values the engine returns.

use std::fmt;

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Tenant-scoped record types known to the authorization core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    LabMaster,
    OutpatientQueue,
    Patient,
    Department,
    InventoryItem,
}

/// How `delete` is decided for a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Same company/plant rule as `update`.
    TenantScoped,
    /// Nobody below the super admin bypass may delete.
    Never,
}

impl ResourceKind {
    /// Per-type delete rules. Queue history is kept forever.
    pub fn delete_policy(self) -> DeletePolicy {
        match self {
            ResourceKind::OutpatientQueue => DeletePolicy::Never,
            ResourceKind::LabMaster => DeletePolicy::TenantScoped,
            ResourceKind::Patient => DeletePolicy::TenantScoped,
            ResourceKind::Department => DeletePolicy::TenantScoped,
            ResourceKind::InventoryItem => DeletePolicy::TenantScoped,
        }
    }
}

/// Something a user asks to do.
///
/// The record actions mirror the usual policy verbs; `Module` and `Permission`
/// are the coarse checks used by the request gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    ViewAny,
    View,
    Create,
    Update,
    Delete,
    Restore,
    ForceDelete,
    Module(&'a str),
    Permission(&'a str),
}

impl Action<'static> {
    pub const RECORD_ACTIONS: [Action<'static>; 7] = [
        Action::ViewAny,
        Action::View,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Restore,
        Action::ForceDelete,
    ];
}

impl Action<'_> {
    pub fn name(&self) -> &str {
        match self {
            Action::ViewAny => "viewAny",
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Restore => "restore",
            Action::ForceDelete => "forceDelete",
            Action::Module(module) => *module,
            Action::Permission(permission) => *permission,
        }
    }

    /// Record-level actions need the target record to be decided.
    pub fn needs_record(&self) -> bool {
        matches!(
            self,
            Action::View | Action::Update | Action::Delete | Action::Restore | Action::ForceDelete
        )
    }
}

impl fmt::Display for Action<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Module(module) => write!(f, "module:{module}"),
            Action::Permission(permission) => write!(f, "permission:{permission}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Why an action was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Grant {
    SuperAdmin,
    Authenticated,
    TenantMatch,
    ModuleAccess,
    Permission,
}

/// Why an action was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    TenantMismatch,
    Immutable(ResourceKind),
    MissingResource,
    MissingTenant,
    NoModuleAccess(String),
    MissingPermission(String),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::TenantMismatch => f.write_str("tenant mismatch"),
            DenyReason::Immutable(kind) => write!(f, "{kind} records cannot be deleted"),
            DenyReason::MissingResource => f.write_str("record required for this action"),
            DenyReason::MissingTenant => f.write_str("user has no company/plant assignment"),
            DenyReason::NoModuleAccess(module) => write!(f, "no access to module {module}"),
            DenyReason::MissingPermission(permission) => write!(f, "missing permission {permission}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed(Grant),
    Denied(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed(_))
    }

    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }

    pub fn reason(&self) -> Option<&DenyReason> {
        match self {
            Decision::Allowed(_) => None,
            Decision::Denied(reason) => Some(reason),
        }
    }

    /// Turns a denial into `AccessError::Forbidden` for callers that abort on it.
    pub fn into_result(self) -> Result<(), crate::auth::AccessError> {
        match self {
            Decision::Allowed(_) => Ok(()),
            Decision::Denied(reason) => Err(crate::auth::AccessError::Forbidden(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_only_queues_are_never_deletable() {
        for kind in ResourceKind::iter() {
            let expected = if kind == ResourceKind::OutpatientQueue {
                DeletePolicy::Never
            } else {
                DeletePolicy::TenantScoped
            };
            assert_eq!(kind.delete_policy(), expected, "{kind}");
        }
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::ViewAny.to_string(), "viewAny");
        assert_eq!(Action::ForceDelete.to_string(), "forceDelete");
        assert_eq!(Action::Module("laboratorium").to_string(), "module:laboratorium");
        assert_eq!(Action::Module("laboratorium").name(), "laboratorium");
    }

    #[test]
    fn test_record_actions_needing_a_record() {
        let needing: Vec<_> = Action::RECORD_ACTIONS
            .iter()
            .filter(|action| action.needs_record())
            .collect();
        assert_eq!(needing.len(), 5);
        assert!(!Action::ViewAny.needs_record());
        assert!(!Action::Create.needs_record());
        assert!(!Action::Module("inventory").needs_record());
    }

    #[test]
    fn test_resource_kind_parses_snake_case() {
        assert_eq!("outpatient_queue".parse::<ResourceKind>(), Ok(ResourceKind::OutpatientQueue));
        assert_eq!(ResourceKind::LabMaster.as_ref(), "lab_master");
    }

    #[test]
    fn test_denied_decision_into_result_is_forbidden() {
        let err = Decision::Denied(DenyReason::TenantMismatch).into_result().unwrap_err();
        assert!(matches!(err, crate::auth::AccessError::Forbidden(DenyReason::TenantMismatch)));
        assert!(Decision::Allowed(Grant::TenantMatch).into_result().is_ok());
    }
}
