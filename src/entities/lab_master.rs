//! `SeaORM` Entity, laboratory examination master data

use sea_orm::entity::prelude::*;

use crate::auth::{ResourceKind, Tenant, TenantScoped};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "lab_master")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub plant_id: Uuid,
    pub code: String,
    pub name: String,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl TenantScoped for Model {
    const KIND: ResourceKind = ResourceKind::LabMaster;

    fn resource_id(&self) -> Uuid {
        self.id
    }

    fn tenant(&self) -> Tenant {
        Tenant::new(self.company_id, self.plant_id)
    }
}
