//! `SeaORM` Entity, outpatient queue ticket
//!
//! A queue row has no tenancy columns of its own; it belongs to the tenant of its patient.

use sea_orm::entity::prelude::*;

use crate::auth::{ResourceKind, ResourceRef};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "outpatient_queue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub patient_id: Uuid,
    pub department_id: Uuid,
    pub queue_number: i32,
    pub status: String,
    pub visit_date: Date,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patient::Entity",
        from = "Column::PatientId",
        to = "super::patient::Column::Id"
    )]
    Patient,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
}

impl Related<super::patient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds the authorization snapshot using the owning patient's tenancy.
    pub fn resource_ref(&self, patient: &super::patient::Model) -> ResourceRef {
        ResourceRef::new(
            ResourceKind::OutpatientQueue,
            self.id,
            crate::auth::TenantScoped::tenant(patient),
        )
    }
}
