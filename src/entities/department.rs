//! `SeaORM` Entity, clinic department (poli)

use sea_orm::entity::prelude::*;

use crate::auth::{ResourceKind, Tenant, TenantScoped};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "department")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub plant_id: Uuid,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::outpatient_queue::Entity")]
    OutpatientQueue,
}

impl Related<super::outpatient_queue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OutpatientQueue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Model {
    const KIND: ResourceKind = ResourceKind::Department;

    fn resource_id(&self) -> Uuid {
        self.id
    }

    fn tenant(&self) -> Tenant {
        Tenant::new(self.company_id, self.plant_id)
    }
}
