use async_graphql::*;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::auth::catalog::{modules, permissions};
use crate::auth::{require_auth, require_module, require_permission};
use crate::graphql::types::{Department, InventoryItem, LabMaster, Me, OutpatientQueue, User};
use crate::services::{DepartmentService, InventoryService, LabMasterService, OutpatientQueueService, QueueStatus, UserService};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn health(&self) -> &str {
        "OK"
    }

    async fn me(&self, ctx: &Context<'_>) -> Result<Me> {
        let user = require_auth(ctx)?;
        Ok(Me::from(user))
    }

    /// Stored account row of the caller.
    async fn my_account(&self, ctx: &Context<'_>) -> Result<User> {
        let user = require_auth(ctx)?;
        let user_service = ctx.data::<UserService>()?;

        let account = user_service
            .find_user_by_id(user.id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| Error::new("User not found"))?;

        Ok(account.into())
    }

    async fn my_modules(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
        let user = require_auth(ctx)?;
        Ok(user.grants().map(|g| g.modules()).unwrap_or_default())
    }

    async fn my_permissions(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
        let user = require_auth(ctx)?;
        Ok(user.grants().map(|g| g.names()).unwrap_or_default())
    }

    async fn lab_masters(
        &self,
        ctx: &Context<'_>,
        include_deleted: Option<bool>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<LabMaster>> {
        let user = require_module(ctx, modules::LABORATORIUM)?;
        let lab_master_service = ctx.data::<LabMasterService>()?;

        let labs = lab_master_service
            .list_lab_masters(user, include_deleted.unwrap_or(false), limit, offset)
            .await
            .map_err(|e| e.extend())?;

        Ok(labs.into_iter().map(|lab| lab.into()).collect())
    }

    async fn lab_master(&self, ctx: &Context<'_>, lab_master_id: Uuid) -> Result<LabMaster> {
        let user = require_module(ctx, modules::LABORATORIUM)?;
        let lab_master_service = ctx.data::<LabMasterService>()?;

        let lab = lab_master_service
            .get_lab_master(user, lab_master_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(lab.into())
    }

    async fn outpatient_queues(
        &self,
        ctx: &Context<'_>,
        visit_date: Option<NaiveDate>,
        status: Option<QueueStatus>,
    ) -> Result<Vec<OutpatientQueue>> {
        let user = require_module(ctx, modules::OUTPATIENT)?;
        let queue_service = ctx.data::<OutpatientQueueService>()?;

        let queues = queue_service
            .list_queues(user, visit_date, status)
            .await
            .map_err(|e| e.extend())?;

        Ok(queues.into_iter().map(|row| row.into()).collect())
    }

    async fn outpatient_queue(&self, ctx: &Context<'_>, queue_id: Uuid) -> Result<OutpatientQueue> {
        let user = require_module(ctx, modules::OUTPATIENT)?;
        let queue_service = ctx.data::<OutpatientQueueService>()?;

        let row = queue_service
            .get_queue(user, queue_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(row.into())
    }

    async fn departments(&self, ctx: &Context<'_>, active_only: Option<bool>) -> Result<Vec<Department>> {
        let user = require_module(ctx, modules::MASTER_DATA)?;
        let department_service = ctx.data::<DepartmentService>()?;

        let departments = department_service
            .list_departments(user, active_only.unwrap_or(true))
            .await
            .map_err(|e| e.extend())?;

        Ok(departments.into_iter().map(|d| d.into()).collect())
    }

    async fn department(&self, ctx: &Context<'_>, department_id: Uuid) -> Result<Department> {
        let user = require_module(ctx, modules::MASTER_DATA)?;
        let department_service = ctx.data::<DepartmentService>()?;

        let department = department_service
            .get_department(user, department_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(department.into())
    }

    async fn inventory_items(&self, ctx: &Context<'_>, search: Option<String>) -> Result<Vec<InventoryItem>> {
        let user = require_permission(ctx, permissions::INVENTORY_ITEM_VIEW)?;
        let inventory_service = ctx.data::<InventoryService>()?;

        let items = inventory_service
            .list_items(user, search)
            .await
            .map_err(|e| e.extend())?;

        Ok(items.into_iter().map(|item| item.into()).collect())
    }

    async fn inventory_item(&self, ctx: &Context<'_>, item_id: Uuid) -> Result<InventoryItem> {
        let user = require_permission(ctx, permissions::INVENTORY_ITEM_VIEW)?;
        let inventory_service = ctx.data::<InventoryService>()?;

        let item = inventory_service
            .get_item(user, item_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(item.into())
    }
}
