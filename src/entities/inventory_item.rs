//! `SeaORM` Entity, stock item held by a plant

use sea_orm::entity::prelude::*;

use crate::auth::{ResourceKind, Tenant, TenantScoped};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "inventory_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub plant_id: Uuid,
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub quantity: i32,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Model {
    const KIND: ResourceKind = ResourceKind::InventoryItem;

    fn resource_id(&self) -> Uuid {
        self.id
    }

    fn tenant(&self) -> Tenant {
        Tenant::new(self.company_id, self.plant_id)
    }
}
