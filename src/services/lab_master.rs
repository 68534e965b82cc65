use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::{
    check_plant, creation_tenant, scope_to_tenant, AccessError, Action, AuthenticatedUser, AuthorizationEngine, Tenant,
    TenantScoped,
};
use crate::entities::{lab_master, prelude::*};

#[derive(Debug, Clone)]
pub struct NewLabMaster {
    pub code: String,
    pub name: String,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    /// Only meaningful for super admins; scoped users create in their own tenant.
    pub tenant: Option<Tenant>,
}

#[derive(Debug, Clone, Default)]
pub struct LabMasterChanges {
    pub name: Option<String>,
    pub unit: Option<Option<String>>,
    pub reference_range: Option<Option<String>>,
}

#[derive(Clone)]
pub struct LabMasterService {
    db: DatabaseConnection,
    engine: AuthorizationEngine,
}

impl LabMasterService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            engine: AuthorizationEngine::new(),
        }
    }

    /// Lab masters visible to the user, ordered by code.
    pub async fn list_lab_masters(
        &self,
        user: &AuthenticatedUser,
        include_deleted: bool,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<lab_master::Model>, AccessError> {
        self.engine.authorize(Some(user), Action::ViewAny, None)?;

        let mut query = scope_to_tenant(
            LabMaster::find(),
            user,
            lab_master::Column::CompanyId,
            lab_master::Column::PlantId,
        )
        .order_by_asc(lab_master::Column::Code);

        if !include_deleted {
            query = query.filter(lab_master::Column::DeletedAt.is_null());
        }

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        if let Some(offset) = offset {
            query = query.offset(offset);
        }

        Ok(query.all(&self.db).await?)
    }

    pub async fn get_lab_master(
        &self,
        user: &AuthenticatedUser,
        lab_master_id: Uuid,
    ) -> Result<lab_master::Model, AccessError> {
        let lab = self.find_live(lab_master_id).await?;
        self.engine
            .authorize(Some(user), Action::View, Some(&lab.resource_ref()))?;
        Ok(lab)
    }

    pub async fn create_lab_master(
        &self,
        user: &AuthenticatedUser,
        input: NewLabMaster,
    ) -> Result<lab_master::Model, AccessError> {
        self.engine.authorize(Some(user), Action::Create, None)?;
        let tenant = creation_tenant(user, input.tenant)?;
        let plant = Plant::find_by_id(tenant.plant_id).one(&self.db).await?;
        check_plant(plant.as_ref(), tenant)?;

        let code = input.code.trim().to_string();
        let name = input.name.trim().to_string();
        if code.is_empty() || name.is_empty() {
            return Err(AccessError::InvalidInput("code and name are required".to_string()));
        }

        // Codes are unique per plant among live rows
        if LabMaster::find()
            .filter(lab_master::Column::CompanyId.eq(tenant.company_id))
            .filter(lab_master::Column::PlantId.eq(tenant.plant_id))
            .filter(lab_master::Column::Code.eq(&code))
            .filter(lab_master::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(AccessError::InvalidInput(format!("lab master code {code} already exists")));
        }

        let new_lab = lab_master::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(tenant.company_id),
            plant_id: Set(tenant.plant_id),
            code: Set(code),
            name: Set(name),
            unit: Set(input.unit),
            reference_range: Set(input.reference_range),
            created_by: Set(user.id),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
            deleted_at: Set(None),
        };

        let lab = new_lab.insert(&self.db).await?;
        info!(lab_master_id = %lab.id, user_id = %user.id, "lab master created");
        Ok(lab)
    }

    pub async fn update_lab_master(
        &self,
        user: &AuthenticatedUser,
        lab_master_id: Uuid,
        changes: LabMasterChanges,
    ) -> Result<lab_master::Model, AccessError> {
        let lab = self.find_live(lab_master_id).await?;
        self.engine
            .authorize(Some(user), Action::Update, Some(&lab.resource_ref()))?;

        let mut lab_active: lab_master::ActiveModel = lab.into();

        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AccessError::InvalidInput("name cannot be empty".to_string()));
            }
            lab_active.name = Set(name);
        }

        if let Some(unit) = changes.unit {
            lab_active.unit = Set(unit);
        }

        if let Some(reference_range) = changes.reference_range {
            lab_active.reference_range = Set(reference_range);
        }

        lab_active.updated_at = Set(Utc::now().into());

        Ok(lab_active.update(&self.db).await?)
    }

    /// Soft delete; the row stays restorable.
    pub async fn delete_lab_master(
        &self,
        user: &AuthenticatedUser,
        lab_master_id: Uuid,
    ) -> Result<(), AccessError> {
        let lab = self.find_live(lab_master_id).await?;
        self.engine
            .authorize(Some(user), Action::Delete, Some(&lab.resource_ref()))?;

        let mut lab_active: lab_master::ActiveModel = lab.into();
        lab_active.deleted_at = Set(Some(Utc::now().into()));
        lab_active.updated_at = Set(Utc::now().into());
        lab_active.update(&self.db).await?;

        info!(%lab_master_id, user_id = %user.id, "lab master deleted");
        Ok(())
    }

    pub async fn restore_lab_master(
        &self,
        user: &AuthenticatedUser,
        lab_master_id: Uuid,
    ) -> Result<lab_master::Model, AccessError> {
        let lab = self.find_any(lab_master_id).await?;
        self.engine
            .authorize(Some(user), Action::Restore, Some(&lab.resource_ref()))?;

        if !lab.is_deleted() {
            return Ok(lab);
        }

        let mut lab_active: lab_master::ActiveModel = lab.into();
        lab_active.deleted_at = Set(None);
        lab_active.updated_at = Set(Utc::now().into());

        let restored = lab_active.update(&self.db).await?;
        info!(%lab_master_id, user_id = %user.id, "lab master restored");
        Ok(restored)
    }

    /// Permanently remove the row, deleted or not.
    pub async fn force_delete_lab_master(
        &self,
        user: &AuthenticatedUser,
        lab_master_id: Uuid,
    ) -> Result<(), AccessError> {
        let lab = self.find_any(lab_master_id).await?;
        self.engine
            .authorize(Some(user), Action::ForceDelete, Some(&lab.resource_ref()))?;

        LabMaster::delete_by_id(lab.id).exec(&self.db).await?;

        info!(%lab_master_id, user_id = %user.id, "lab master permanently deleted");
        Ok(())
    }

    async fn find_any(&self, lab_master_id: Uuid) -> Result<lab_master::Model, AccessError> {
        LabMaster::find_by_id(lab_master_id)
            .one(&self.db)
            .await?
            .ok_or(AccessError::NotFound("lab master"))
    }

    async fn find_live(&self, lab_master_id: Uuid) -> Result<lab_master::Model, AccessError> {
        let lab = self.find_any(lab_master_id).await?;
        if lab.is_deleted() {
            return Err(AccessError::NotFound("lab master"));
        }
        Ok(lab)
    }
}
