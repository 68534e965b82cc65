use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;

use crate::auth::{scope_to_tenant, AccessError, Action, AuthenticatedUser, AuthorizationEngine, TenantScoped};
use crate::entities::{inventory_item, prelude::*};

#[derive(Clone)]
pub struct InventoryService {
    db: DatabaseConnection,
    engine: AuthorizationEngine,
}

impl InventoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            engine: AuthorizationEngine::new(),
        }
    }

    pub async fn list_items(
        &self,
        user: &AuthenticatedUser,
        search: Option<String>,
    ) -> Result<Vec<inventory_item::Model>, AccessError> {
        self.engine.authorize(Some(user), Action::ViewAny, None)?;

        let mut query = scope_to_tenant(
            InventoryItem::find(),
            user,
            inventory_item::Column::CompanyId,
            inventory_item::Column::PlantId,
        )
        .filter(inventory_item::Column::IsActive.eq(true))
        .order_by_asc(inventory_item::Column::Sku);

        if let Some(search) = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            query = query.filter(inventory_item::Column::Name.contains(&search));
        }

        Ok(query.all(&self.db).await?)
    }

    pub async fn get_item(
        &self,
        user: &AuthenticatedUser,
        item_id: Uuid,
    ) -> Result<inventory_item::Model, AccessError> {
        let item = self.find(item_id).await?;
        self.engine
            .authorize(Some(user), Action::View, Some(&item.resource_ref()))?;
        Ok(item)
    }

    /// Apply a stock movement. The resulting quantity may not go below zero.
    pub async fn adjust_quantity(
        &self,
        user: &AuthenticatedUser,
        item_id: Uuid,
        delta: i32,
    ) -> Result<inventory_item::Model, AccessError> {
        let item = self.find(item_id).await?;
        self.engine
            .authorize(Some(user), Action::Update, Some(&item.resource_ref()))?;

        let quantity = apply_delta(item.quantity, delta)?;

        let mut item_active: inventory_item::ActiveModel = item.into();
        item_active.quantity = Set(quantity);
        item_active.updated_at = Set(Utc::now().into());

        let item = item_active.update(&self.db).await?;
        info!(%item_id, delta, quantity, user_id = %user.id, "inventory quantity adjusted");
        Ok(item)
    }

    pub async fn deactivate_item(
        &self,
        user: &AuthenticatedUser,
        item_id: Uuid,
    ) -> Result<inventory_item::Model, AccessError> {
        let item = self.find(item_id).await?;
        self.engine
            .authorize(Some(user), Action::Delete, Some(&item.resource_ref()))?;

        let mut item_active: inventory_item::ActiveModel = item.into();
        item_active.is_active = Set(false);
        item_active.updated_at = Set(Utc::now().into());

        let item = item_active.update(&self.db).await?;
        info!(%item_id, user_id = %user.id, "inventory item deactivated");
        Ok(item)
    }

    async fn find(&self, item_id: Uuid) -> Result<inventory_item::Model, AccessError> {
        InventoryItem::find_by_id(item_id)
            .one(&self.db)
            .await?
            .ok_or(AccessError::NotFound("inventory item"))
    }
}

fn apply_delta(quantity: i32, delta: i32) -> Result<i32, AccessError> {
    match quantity.checked_add(delta) {
        Some(next) if next >= 0 => Ok(next),
        _ => Err(AccessError::InvalidInput(format!(
            "cannot adjust quantity {quantity} by {delta}"
        ))),
    }
}
