use async_graphql::*;
use uuid::Uuid;

use crate::auth::catalog::permissions;
use crate::auth::require_permission;
use crate::graphql::types::{
    AdjustInventoryInput, AuthPayload, CreateLabMasterInput, CreateQueueInput, Department, InventoryItem, LabMaster,
    LoginInput, MessageResponse, OutpatientQueue, UpdateLabMasterInput, UpdateQueueStatusInput,
};
use crate::services::{DepartmentService, InventoryService, LabMasterService, OutpatientQueueService, UserService};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<AuthPayload> {
        let user_service = ctx.data::<UserService>()?;

        let (user, access_token) = user_service
            .authenticate_user(&input.email, &input.password)
            .await
            .map_err(|e| e.extend())?;

        Ok(AuthPayload {
            user: user.into(),
            access_token,
            expires_in_hours: user_service.token_expiration_hours(),
        })
    }

    async fn create_lab_master(&self, ctx: &Context<'_>, input: CreateLabMasterInput) -> Result<LabMaster> {
        let user = require_permission(ctx, permissions::LAB_MASTER_CREATE)?;
        let lab_master_service = ctx.data::<LabMasterService>()?;

        let new_lab = input.into_new().map_err(|e| e.extend())?;
        let lab = lab_master_service
            .create_lab_master(user, new_lab)
            .await
            .map_err(|e| e.extend())?;

        Ok(lab.into())
    }

    async fn update_lab_master(
        &self,
        ctx: &Context<'_>,
        lab_master_id: Uuid,
        input: UpdateLabMasterInput,
    ) -> Result<LabMaster> {
        let user = require_permission(ctx, permissions::LAB_MASTER_UPDATE)?;
        let lab_master_service = ctx.data::<LabMasterService>()?;

        let lab = lab_master_service
            .update_lab_master(user, lab_master_id, input.into())
            .await
            .map_err(|e| e.extend())?;

        Ok(lab.into())
    }

    async fn delete_lab_master(&self, ctx: &Context<'_>, lab_master_id: Uuid) -> Result<MessageResponse> {
        let user = require_permission(ctx, permissions::LAB_MASTER_DELETE)?;
        let lab_master_service = ctx.data::<LabMasterService>()?;

        lab_master_service
            .delete_lab_master(user, lab_master_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse {
            message: "Lab master deleted".to_string(),
        })
    }

    async fn restore_lab_master(&self, ctx: &Context<'_>, lab_master_id: Uuid) -> Result<LabMaster> {
        let user = require_permission(ctx, permissions::LAB_MASTER_DELETE)?;
        let lab_master_service = ctx.data::<LabMasterService>()?;

        let lab = lab_master_service
            .restore_lab_master(user, lab_master_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(lab.into())
    }

    async fn force_delete_lab_master(&self, ctx: &Context<'_>, lab_master_id: Uuid) -> Result<MessageResponse> {
        let user = require_permission(ctx, permissions::LAB_MASTER_DELETE)?;
        let lab_master_service = ctx.data::<LabMasterService>()?;

        lab_master_service
            .force_delete_lab_master(user, lab_master_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse {
            message: "Lab master permanently deleted".to_string(),
        })
    }

    async fn create_outpatient_queue(&self, ctx: &Context<'_>, input: CreateQueueInput) -> Result<OutpatientQueue> {
        let user = require_permission(ctx, permissions::OUTPATIENT_QUEUE_CREATE)?;
        let queue_service = ctx.data::<OutpatientQueueService>()?;

        let row = queue_service
            .create_queue(user, input.patient_id, input.department_id, input.visit_date)
            .await
            .map_err(|e| e.extend())?;

        Ok(row.into())
    }

    async fn update_outpatient_queue_status(
        &self,
        ctx: &Context<'_>,
        input: UpdateQueueStatusInput,
    ) -> Result<OutpatientQueue> {
        let user = require_permission(ctx, permissions::OUTPATIENT_QUEUE_UPDATE)?;
        let queue_service = ctx.data::<OutpatientQueueService>()?;

        let row = queue_service
            .update_queue_status(user, input.queue_id, input.status)
            .await
            .map_err(|e| e.extend())?;

        Ok(row.into())
    }

    /// Refused for every role except super admin, whatever permissions it holds.
    async fn delete_outpatient_queue(&self, ctx: &Context<'_>, queue_id: Uuid) -> Result<MessageResponse> {
        let user = require_permission(ctx, permissions::OUTPATIENT_QUEUE_DELETE)?;
        let queue_service = ctx.data::<OutpatientQueueService>()?;

        queue_service
            .delete_queue(user, queue_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse {
            message: "Queue ticket deleted".to_string(),
        })
    }

    async fn adjust_inventory(&self, ctx: &Context<'_>, input: AdjustInventoryInput) -> Result<InventoryItem> {
        let user = require_permission(ctx, permissions::INVENTORY_ITEM_UPDATE)?;
        let inventory_service = ctx.data::<InventoryService>()?;

        let item = inventory_service
            .adjust_quantity(user, input.item_id, input.delta)
            .await
            .map_err(|e| e.extend())?;

        Ok(item.into())
    }

    async fn deactivate_inventory_item(&self, ctx: &Context<'_>, item_id: Uuid) -> Result<InventoryItem> {
        let user = require_permission(ctx, permissions::INVENTORY_ITEM_UPDATE)?;
        let inventory_service = ctx.data::<InventoryService>()?;

        let item = inventory_service
            .deactivate_item(user, item_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(item.into())
    }

    async fn rename_department(&self, ctx: &Context<'_>, department_id: Uuid, name: String) -> Result<Department> {
        let user = require_permission(ctx, permissions::DEPARTMENT_UPDATE)?;
        let department_service = ctx.data::<DepartmentService>()?;

        let department = department_service
            .rename_department(user, department_id, name)
            .await
            .map_err(|e| e.extend())?;

        Ok(department.into())
    }

    async fn deactivate_department(&self, ctx: &Context<'_>, department_id: Uuid) -> Result<Department> {
        let user = require_permission(ctx, permissions::DEPARTMENT_UPDATE)?;
        let department_service = ctx.data::<DepartmentService>()?;

        let department = department_service
            .deactivate_department(user, department_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(department.into())
    }
}
