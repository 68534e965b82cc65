//! Company → Plant ownership scope for users and records.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AccessError, AuthenticatedUser, DenyReason, ResourceKind};
use crate::entities::plant;

/// A company/plant pair. Two tenants are the same only when both ids match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenant {
    pub company_id: Uuid,
    pub plant_id: Uuid,
}

impl Tenant {
    pub fn new(company_id: Uuid, plant_id: Uuid) -> Self {
        Self { company_id, plant_id }
    }

    pub fn owns(&self, resource: &ResourceRef) -> bool {
        self.company_id == resource.tenant.company_id && self.plant_id == resource.tenant.plant_id
    }
}

/// What the engine needs to know about a record: its type, id and owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: Uuid,
    pub tenant: Tenant,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, id: Uuid, tenant: Tenant) -> Self {
        Self { kind, id, tenant }
    }
}

/// Implemented by records that carry their own `company_id`/`plant_id`.
pub trait TenantScoped {
    const KIND: ResourceKind;

    fn resource_id(&self) -> Uuid;

    fn tenant(&self) -> Tenant;

    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::new(Self::KIND, self.resource_id(), self.tenant())
    }
}

/// Restricts a list query to the caller's tenant. Super admins are not filtered.
pub fn scope_to_tenant<E, C>(
    query: Select<E>,
    user: &AuthenticatedUser,
    company_column: C,
    plant_column: C,
) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match user.tenant() {
        Some(tenant) => query
            .filter(company_column.eq(tenant.company_id))
            .filter(plant_column.eq(tenant.plant_id)),
        None => query,
    }
}

/// Tenant a new record is stamped with.
///
/// Scoped users always create inside their own tenant; naming another one is
/// refused. A super admin has no tenant and must name one explicitly.
pub fn creation_tenant(
    user: &AuthenticatedUser,
    requested: Option<Tenant>,
) -> Result<Tenant, AccessError> {
    match (user.tenant(), requested) {
        (Some(own), Some(requested)) if own != requested => {
            Err(AccessError::Forbidden(DenyReason::TenantMismatch))
        }
        (Some(own), _) => Ok(own),
        (None, Some(requested)) => Ok(requested),
        (None, None) => Err(AccessError::InvalidInput(
            "company_id and plant_id are required".to_string(),
        )),
    }
}

/// Checks that a tenant pair names a real, active plant of that company.
///
/// Needed wherever a super admin supplies the pair, since nothing else ties the
/// two ids together.
pub fn check_plant(plant: Option<&plant::Model>, tenant: Tenant) -> Result<(), AccessError> {
    match plant {
        None => Err(AccessError::InvalidInput(format!(
            "plant {} does not exist",
            tenant.plant_id
        ))),
        Some(plant) if plant.company_id != tenant.company_id => Err(AccessError::InvalidInput(format!(
            "plant {} does not belong to company {}",
            plant.id, tenant.company_id
        ))),
        Some(plant) if !plant.is_active => Err(AccessError::InvalidInput(format!(
            "plant {} is not active",
            plant.id
        ))),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{lab_master, prelude::LabMaster};
    use chrono::Utc;
    use sea_orm::{DbBackend, QueryTrait};

    fn plant_row(id: Uuid, company_id: Uuid, is_active: bool) -> plant::Model {
        plant::Model {
            id,
            company_id,
            code: "PLT".to_string(),
            name: "Main clinic".to_string(),
            is_active,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_owns_requires_both_ids() {
        let tenant = Tenant::new(id(1), id(1));

        let same = ResourceRef::new(ResourceKind::LabMaster, id(10), Tenant::new(id(1), id(1)));
        let other_plant = ResourceRef::new(ResourceKind::LabMaster, id(11), Tenant::new(id(1), id(2)));
        let other_company = ResourceRef::new(ResourceKind::LabMaster, id(12), Tenant::new(id(2), id(1)));

        assert!(tenant.owns(&same));
        assert!(!tenant.owns(&other_plant));
        assert!(!tenant.owns(&other_company));
    }

    #[test]
    fn test_creation_tenant_for_scoped_user() {
        let own = Tenant::new(id(1), id(1));
        let user = AuthenticatedUser::scoped(id(5), "a@clinic.test", "user", own, Default::default());

        assert_eq!(creation_tenant(&user, None).unwrap(), own);
        assert_eq!(creation_tenant(&user, Some(own)).unwrap(), own);
        assert!(matches!(
            creation_tenant(&user, Some(Tenant::new(id(1), id(2)))),
            Err(AccessError::Forbidden(DenyReason::TenantMismatch))
        ));
    }

    #[test]
    fn test_creation_tenant_for_super_admin() {
        let root = AuthenticatedUser::super_admin(id(1), "root@clinic.test");
        let target = Tenant::new(id(3), id(4));

        assert_eq!(creation_tenant(&root, Some(target)).unwrap(), target);
        assert!(matches!(creation_tenant(&root, None), Err(AccessError::InvalidInput(_))));
    }

    #[test]
    fn test_check_plant_rejects_pair_across_companies() {
        let plant_of_c = plant_row(id(20), id(3), true);
        let requested = Tenant::new(id(1), id(20));

        assert!(matches!(
            check_plant(Some(&plant_of_c), requested),
            Err(AccessError::InvalidInput(msg)) if msg.contains("does not belong")
        ));
    }

    #[test]
    fn test_check_plant_missing_or_inactive() {
        let requested = Tenant::new(id(1), id(20));
        assert!(check_plant(None, requested).is_err());

        let closed = plant_row(id(20), id(1), false);
        assert!(check_plant(Some(&closed), requested).is_err());

        let open = plant_row(id(20), id(1), true);
        assert!(check_plant(Some(&open), requested).is_ok());
    }

    #[test]
    fn test_scope_to_tenant_filters_both_ids() {
        let nurse = AuthenticatedUser::scoped(id(5), "a@clinic.test", "user", Tenant::new(id(1), id(2)), Default::default());

        let sql = scope_to_tenant(
            LabMaster::find(),
            &nurse,
            lab_master::Column::CompanyId,
            lab_master::Column::PlantId,
        )
        .build(DbBackend::Postgres)
        .to_string();

        let (_, where_clause) = sql.split_once("WHERE").expect("scoped query has a WHERE clause");
        assert!(where_clause.contains(r#""lab_master"."company_id" = "#), "{sql}");
        assert!(where_clause.contains(r#""lab_master"."plant_id" = "#), "{sql}");
        assert!(where_clause.contains(&id(1).to_string()), "{sql}");
        assert!(where_clause.contains(&id(2).to_string()), "{sql}");
    }

    #[test]
    fn test_scope_to_tenant_leaves_super_admin_unfiltered() {
        let root = AuthenticatedUser::super_admin(id(1), "root@clinic.test");

        let sql = scope_to_tenant(
            LabMaster::find(),
            &root,
            lab_master::Column::CompanyId,
            lab_master::Column::PlantId,
        )
        .build(DbBackend::Postgres)
        .to_string();

        assert!(!sql.contains("WHERE"), "{sql}");
    }
}
