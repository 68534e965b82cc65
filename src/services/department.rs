use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;

use crate::auth::{scope_to_tenant, AccessError, Action, AuthenticatedUser, AuthorizationEngine, TenantScoped};
use crate::entities::{department, prelude::*};

#[derive(Clone)]
pub struct DepartmentService {
    db: DatabaseConnection,
    engine: AuthorizationEngine,
}

impl DepartmentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            engine: AuthorizationEngine::new(),
        }
    }

    pub async fn list_departments(
        &self,
        user: &AuthenticatedUser,
        active_only: bool,
    ) -> Result<Vec<department::Model>, AccessError> {
        self.engine.authorize(Some(user), Action::ViewAny, None)?;

        let mut query = scope_to_tenant(
            Department::find(),
            user,
            department::Column::CompanyId,
            department::Column::PlantId,
        )
        .order_by_asc(department::Column::Name);

        if active_only {
            query = query.filter(department::Column::IsActive.eq(true));
        }

        Ok(query.all(&self.db).await?)
    }

    pub async fn get_department(
        &self,
        user: &AuthenticatedUser,
        department_id: Uuid,
    ) -> Result<department::Model, AccessError> {
        let department = self.find(department_id).await?;
        self.engine
            .authorize(Some(user), Action::View, Some(&department.resource_ref()))?;
        Ok(department)
    }

    pub async fn rename_department(
        &self,
        user: &AuthenticatedUser,
        department_id: Uuid,
        name: String,
    ) -> Result<department::Model, AccessError> {
        let department = self.find(department_id).await?;
        self.engine
            .authorize(Some(user), Action::Update, Some(&department.resource_ref()))?;

        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AccessError::InvalidInput("name cannot be empty".to_string()));
        }

        let mut department_active: department::ActiveModel = department.into();
        department_active.name = Set(name);
        department_active.updated_at = Set(Utc::now().into());

        Ok(department_active.update(&self.db).await?)
    }

    /// Departments are never removed, only switched off.
    pub async fn deactivate_department(
        &self,
        user: &AuthenticatedUser,
        department_id: Uuid,
    ) -> Result<department::Model, AccessError> {
        let department = self.find(department_id).await?;
        self.engine
            .authorize(Some(user), Action::Delete, Some(&department.resource_ref()))?;

        let mut department_active: department::ActiveModel = department.into();
        department_active.is_active = Set(false);
        department_active.updated_at = Set(Utc::now().into());

        let department = department_active.update(&self.db).await?;
        info!(%department_id, user_id = %user.id, "department deactivated");
        Ok(department)
    }

    async fn find(&self, department_id: Uuid) -> Result<department::Model, AccessError> {
        Department::find_by_id(department_id)
            .one(&self.db)
            .await?
            .ok_or(AccessError::NotFound("department"))
    }
}
