use async_graphql::*;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{AuthenticatedUser, Tenant};
use crate::services::{LabMasterChanges, NewLabMaster, QueueStatus};

#[derive(SimpleObject, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub company_id: Option<Uuid>,
    pub plant_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entities::user::Model> for User {
    fn from(user: crate::entities::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            company_id: user.company_id,
            plant_id: user.plant_id,
            is_active: user.is_active,
            created_at: user.created_at.into(),
            updated_at: user.updated_at.into(),
        }
    }
}

/// The caller as the authorization layer sees it.
#[derive(SimpleObject, Serialize)]
pub struct Me {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub is_super_admin: bool,
    pub company_id: Option<Uuid>,
    pub plant_id: Option<Uuid>,
    pub modules: Vec<String>,
    pub permissions: Vec<String>,
}

impl From<&AuthenticatedUser> for Me {
    fn from(user: &AuthenticatedUser) -> Self {
        let tenant = user.tenant();
        let grants = user.grants();
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role_name.clone(),
            is_super_admin: user.is_super_admin(),
            company_id: tenant.map(|t| t.company_id),
            plant_id: tenant.map(|t| t.plant_id),
            modules: grants.map(|g| g.modules()).unwrap_or_default(),
            permissions: grants.map(|g| g.names()).unwrap_or_default(),
        }
    }
}

#[derive(InputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(SimpleObject)]
pub struct AuthPayload {
    pub user: User,
    pub access_token: String,
    pub expires_in_hours: i64,
}

#[derive(SimpleObject)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(SimpleObject, Serialize)]
pub struct LabMaster {
    pub id: Uuid,
    pub company_id: Uuid,
    pub plant_id: Uuid,
    pub code: String,
    pub name: String,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<crate::entities::lab_master::Model> for LabMaster {
    fn from(lab: crate::entities::lab_master::Model) -> Self {
        Self {
            id: lab.id,
            company_id: lab.company_id,
            plant_id: lab.plant_id,
            code: lab.code,
            name: lab.name,
            unit: lab.unit,
            reference_range: lab.reference_range,
            created_by: lab.created_by,
            created_at: lab.created_at.into(),
            updated_at: lab.updated_at.into(),
            deleted_at: lab.deleted_at.map(|dt| dt.into()),
        }
    }
}

#[derive(InputObject)]
pub struct CreateLabMasterInput {
    pub code: String,
    pub name: String,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    /// Required for super admins, ignored or checked for everyone else.
    pub company_id: Option<Uuid>,
    pub plant_id: Option<Uuid>,
}

impl CreateLabMasterInput {
    pub fn into_new(self) -> std::result::Result<NewLabMaster, crate::auth::AccessError> {
        let tenant = match (self.company_id, self.plant_id) {
            (Some(company_id), Some(plant_id)) => Some(Tenant::new(company_id, plant_id)),
            (None, None) => None,
            _ => {
                return Err(crate::auth::AccessError::InvalidInput(
                    "company_id and plant_id must be given together".to_string(),
                ))
            }
        };

        Ok(NewLabMaster {
            code: self.code,
            name: self.name,
            unit: self.unit,
            reference_range: self.reference_range,
            tenant,
        })
    }
}

#[derive(InputObject)]
pub struct UpdateLabMasterInput {
    pub name: Option<String>,
    pub unit: MaybeUndefined<String>,
    pub reference_range: MaybeUndefined<String>,
}

impl From<UpdateLabMasterInput> for LabMasterChanges {
    fn from(input: UpdateLabMasterInput) -> Self {
        Self {
            name: input.name,
            unit: input.unit.as_opt_ref().map(|v| v.cloned()),
            reference_range: input.reference_range.as_opt_ref().map(|v| v.cloned()),
        }
    }
}

#[derive(SimpleObject, Serialize)]
pub struct OutpatientQueue {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub medical_record_number: String,
    pub department_id: Uuid,
    pub company_id: Uuid,
    pub plant_id: Uuid,
    pub queue_number: i32,
    pub status: String,
    pub visit_date: NaiveDate,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<(crate::entities::outpatient_queue::Model, crate::entities::patient::Model)> for OutpatientQueue {
    fn from(
        (queue, patient): (crate::entities::outpatient_queue::Model, crate::entities::patient::Model),
    ) -> Self {
        Self {
            id: queue.id,
            patient_id: queue.patient_id,
            patient_name: patient.name,
            medical_record_number: patient.medical_record_number,
            department_id: queue.department_id,
            company_id: patient.company_id,
            plant_id: patient.plant_id,
            queue_number: queue.queue_number,
            status: queue.status,
            visit_date: queue.visit_date,
            created_by: queue.created_by,
            created_at: queue.created_at.into(),
            updated_at: queue.updated_at.into(),
        }
    }
}

#[derive(InputObject)]
pub struct CreateQueueInput {
    pub patient_id: Uuid,
    pub department_id: Uuid,
    pub visit_date: NaiveDate,
}

#[derive(InputObject)]
pub struct UpdateQueueStatusInput {
    pub queue_id: Uuid,
    pub status: QueueStatus,
}

#[derive(SimpleObject, Serialize)]
pub struct Department {
    pub id: Uuid,
    pub company_id: Uuid,
    pub plant_id: Uuid,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entities::department::Model> for Department {
    fn from(department: crate::entities::department::Model) -> Self {
        Self {
            id: department.id,
            company_id: department.company_id,
            plant_id: department.plant_id,
            code: department.code,
            name: department.name,
            is_active: department.is_active,
            created_at: department.created_at.into(),
            updated_at: department.updated_at.into(),
        }
    }
}

#[derive(SimpleObject, Serialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub company_id: Uuid,
    pub plant_id: Uuid,
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entities::inventory_item::Model> for InventoryItem {
    fn from(item: crate::entities::inventory_item::Model) -> Self {
        Self {
            id: item.id,
            company_id: item.company_id,
            plant_id: item.plant_id,
            sku: item.sku,
            name: item.name,
            unit: item.unit,
            quantity: item.quantity,
            is_active: item.is_active,
            created_at: item.created_at.into(),
            updated_at: item.updated_at.into(),
        }
    }
}

#[derive(InputObject)]
pub struct AdjustInventoryInput {
    pub item_id: Uuid,
    /// Positive to receive stock, negative to issue it.
    pub delta: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PermissionSet;

    #[test]
    fn test_me_for_scoped_user() {
        let grants: PermissionSet = [
            ("lab_master.update", "laboratorium"),
            ("inventory_item.view", "inventory"),
        ]
        .into_iter()
        .collect();
        let user = AuthenticatedUser::scoped(
            Uuid::from_u128(9),
            "analyst@clinic.test",
            "lab_analyst",
            Tenant::new(Uuid::from_u128(1), Uuid::from_u128(2)),
            grants,
        );

        let me = Me::from(&user);
        assert!(!me.is_super_admin);
        assert_eq!(me.company_id, Some(Uuid::from_u128(1)));
        assert_eq!(me.plant_id, Some(Uuid::from_u128(2)));
        assert_eq!(me.modules, vec!["inventory", "laboratorium"]);
        assert_eq!(me.permissions, vec!["inventory_item.view", "lab_master.update"]);
    }

    #[test]
    fn test_me_for_super_admin() {
        let me = Me::from(&AuthenticatedUser::super_admin(Uuid::from_u128(1), "root@clinic.test"));
        assert!(me.is_super_admin);
        assert_eq!(me.role, "super_admin");
        assert!(me.company_id.is_none());
        assert!(me.permissions.is_empty());
    }

    #[test]
    fn test_create_input_requires_both_tenant_ids() {
        let input = CreateLabMasterInput {
            code: "HB".to_string(),
            name: "Hemoglobin".to_string(),
            unit: Some("g/dL".to_string()),
            reference_range: None,
            company_id: Some(Uuid::from_u128(1)),
            plant_id: None,
        };
        assert!(input.into_new().is_err());
    }

    #[test]
    fn test_update_input_distinguishes_null_from_absent() {
        let changes = LabMasterChanges::from(UpdateLabMasterInput {
            name: None,
            unit: MaybeUndefined::Null,
            reference_range: MaybeUndefined::Undefined,
        });
        assert_eq!(changes.unit, Some(None));
        assert_eq!(changes.reference_range, None);
    }
}
