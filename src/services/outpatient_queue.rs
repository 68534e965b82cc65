use async_graphql::Enum;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    SelectTwo, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AccessError, Action, AuthenticatedUser, AuthorizationEngine, TenantScoped};
use crate::entities::{department, outpatient_queue, patient, prelude::*};

/// Lifecycle of a queue ticket. `Done` and `Cancelled` are final.
#[derive(
    Enum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, EnumIter,
)]
#[graphql(name = "QueueStatus")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueueStatus {
    Waiting,
    Called,
    InProgress,
    Done,
    Cancelled,
}

impl QueueStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, QueueStatus::Done | QueueStatus::Cancelled)
    }
}

#[derive(Clone)]
pub struct OutpatientQueueService {
    db: DatabaseConnection,
    engine: AuthorizationEngine,
}

impl OutpatientQueueService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            engine: AuthorizationEngine::new(),
        }
    }

    /// Queue tickets visible to the user, scoped through the patient's tenancy.
    pub async fn list_queues(
        &self,
        user: &AuthenticatedUser,
        visit_date: Option<NaiveDate>,
        status: Option<QueueStatus>,
    ) -> Result<Vec<(outpatient_queue::Model, patient::Model)>, AccessError> {
        self.engine.authorize(Some(user), Action::ViewAny, None)?;

        let query = list_query(user, visit_date, status);
        let rows = query.all(&self.db).await?;

        Ok(rows
            .into_iter()
            .filter_map(|(queue, patient)| patient.map(|patient| (queue, patient)))
            .collect())
    }

    pub async fn get_queue(
        &self,
        user: &AuthenticatedUser,
        queue_id: Uuid,
    ) -> Result<(outpatient_queue::Model, patient::Model), AccessError> {
        let (queue, patient) = self.find_with_patient(queue_id).await?;
        self.engine
            .authorize(Some(user), Action::View, Some(&queue.resource_ref(&patient)))?;
        Ok((queue, patient))
    }

    /// Register a patient in a department's queue for a visit date.
    ///
    /// The caller must be able to see both the patient and the department;
    /// ticket numbers start at 1 per department and date.
    pub async fn create_queue(
        &self,
        user: &AuthenticatedUser,
        patient_id: Uuid,
        department_id: Uuid,
        visit_date: NaiveDate,
    ) -> Result<(outpatient_queue::Model, patient::Model), AccessError> {
        self.engine.authorize(Some(user), Action::Create, None)?;

        let txn = self.db.begin().await?;

        let patient = Patient::find_by_id(patient_id)
            .one(&txn)
            .await?
            .ok_or(AccessError::NotFound("patient"))?;
        self.engine
            .authorize(Some(user), Action::View, Some(&patient.resource_ref()))?;

        // Held until commit, so numbering for this department is serialized.
        let department = department_for_update(department_id)
            .one(&txn)
            .await?
            .ok_or(AccessError::NotFound("department"))?;
        self.engine
            .authorize(Some(user), Action::View, Some(&department.resource_ref()))?;

        if !department.is_active {
            return Err(AccessError::InvalidInput(format!(
                "department {} is not active",
                department.code
            )));
        }

        if patient.tenant() != department.tenant() {
            return Err(AccessError::InvalidInput(
                "patient and department belong to different plants".to_string(),
            ));
        }

        let last_number = last_ticket_query(department_id, visit_date)
            .one(&txn)
            .await?
            .map(|queue| queue.queue_number)
            .unwrap_or(0);

        let new_queue = outpatient_queue::ActiveModel {
            id: Set(Uuid::new_v4()),
            patient_id: Set(patient_id),
            department_id: Set(department_id),
            queue_number: Set(last_number + 1),
            status: Set(QueueStatus::Waiting.to_string()),
            visit_date: Set(visit_date),
            created_by: Set(user.id),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        let queue = new_queue.insert(&txn).await?;
        txn.commit().await?;

        info!(
            queue_id = %queue.id,
            queue_number = queue.queue_number,
            %department_id,
            user_id = %user.id,
            "outpatient queue ticket created"
        );
        Ok((queue, patient))
    }

    pub async fn update_queue_status(
        &self,
        user: &AuthenticatedUser,
        queue_id: Uuid,
        status: QueueStatus,
    ) -> Result<(outpatient_queue::Model, patient::Model), AccessError> {
        let (queue, patient) = self.find_with_patient(queue_id).await?;
        self.engine
            .authorize(Some(user), Action::Update, Some(&queue.resource_ref(&patient)))?;

        check_transition(queue.id, &queue.status, status)?;

        let mut queue_active: outpatient_queue::ActiveModel = queue.into();
        queue_active.status = Set(status.to_string());
        queue_active.updated_at = Set(Utc::now().into());

        let queue = queue_active.update(&self.db).await?;
        Ok((queue, patient))
    }

    /// Queue history is immutable below super admin; the engine refuses everyone else.
    pub async fn delete_queue(&self, user: &AuthenticatedUser, queue_id: Uuid) -> Result<(), AccessError> {
        let (queue, patient) = self.find_with_patient(queue_id).await?;
        self.engine
            .authorize(Some(user), Action::Delete, Some(&queue.resource_ref(&patient)))?;

        OutpatientQueue::delete_by_id(queue.id).exec(&self.db).await?;

        info!(%queue_id, user_id = %user.id, "outpatient queue ticket deleted");
        Ok(())
    }

    async fn find_with_patient(
        &self,
        queue_id: Uuid,
    ) -> Result<(outpatient_queue::Model, patient::Model), AccessError> {
        match OutpatientQueue::find_by_id(queue_id)
            .find_also_related(Patient)
            .one(&self.db)
            .await?
        {
            Some((queue, Some(patient))) => Ok((queue, patient)),
            _ => Err(AccessError::NotFound("outpatient queue")),
        }
    }
}

fn list_query(
    user: &AuthenticatedUser,
    visit_date: Option<NaiveDate>,
    status: Option<QueueStatus>,
) -> SelectTwo<outpatient_queue::Entity, patient::Entity> {
    let mut query = OutpatientQueue::find()
        .find_also_related(Patient)
        .order_by_asc(outpatient_queue::Column::VisitDate)
        .order_by_asc(outpatient_queue::Column::QueueNumber);

    // Queue rows carry no tenancy; the patient's does.
    if let Some(tenant) = user.tenant() {
        query = query
            .filter(patient::Column::CompanyId.eq(tenant.company_id))
            .filter(patient::Column::PlantId.eq(tenant.plant_id));
    }

    if let Some(visit_date) = visit_date {
        query = query.filter(outpatient_queue::Column::VisitDate.eq(visit_date));
    }

    if let Some(status) = status {
        query = query.filter(outpatient_queue::Column::Status.eq(status.as_ref()));
    }

    query
}

fn department_for_update(department_id: Uuid) -> Select<department::Entity> {
    Department::find_by_id(department_id).lock_exclusive()
}

fn last_ticket_query(department_id: Uuid, visit_date: NaiveDate) -> Select<outpatient_queue::Entity> {
    OutpatientQueue::find()
        .filter(outpatient_queue::Column::DepartmentId.eq(department_id))
        .filter(outpatient_queue::Column::VisitDate.eq(visit_date))
        .order_by_desc(outpatient_queue::Column::QueueNumber)
}

/// A final status may only be re-applied, never left.
fn check_transition(queue_id: Uuid, current: &str, next: QueueStatus) -> Result<(), AccessError> {
    let current = current.parse::<QueueStatus>().map_err(|_| {
        warn!(%queue_id, status = current, "queue ticket has an unknown stored status");
        AccessError::InvalidInput(format!("queue ticket has unknown status {current}"))
    })?;

    if current.is_terminal() && current != next {
        return Err(AccessError::InvalidInput(format!(
            "queue ticket is already {current}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Tenant;
    use sea_orm::{DbBackend, QueryTrait};
    use std::str::FromStr;

    #[test]
    fn test_status_round_trips_as_snake_case() {
        assert_eq!(QueueStatus::InProgress.to_string(), "in_progress");
        assert_eq!(QueueStatus::from_str("cancelled").unwrap(), QueueStatus::Cancelled);
        assert!(QueueStatus::from_str("finished").is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(QueueStatus::Done.is_terminal());
        assert!(QueueStatus::Cancelled.is_terminal());
        assert!(!QueueStatus::Waiting.is_terminal());
        assert!(!QueueStatus::Called.is_terminal());
        assert!(!QueueStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_terminal_status_cannot_be_left() {
        let id = Uuid::from_u128(1);
        assert!(check_transition(id, "waiting", QueueStatus::Called).is_ok());
        assert!(check_transition(id, "in_progress", QueueStatus::Done).is_ok());
        assert!(check_transition(id, "done", QueueStatus::Done).is_ok());
        assert!(matches!(
            check_transition(id, "done", QueueStatus::Waiting),
            Err(AccessError::InvalidInput(_))
        ));
        assert!(check_transition(id, "cancelled", QueueStatus::InProgress).is_err());
    }

    #[test]
    fn test_unknown_stored_status_is_rejected() {
        let err = check_transition(Uuid::from_u128(1), "finished", QueueStatus::Waiting).unwrap_err();
        assert!(matches!(err, AccessError::InvalidInput(msg) if msg.contains("finished")));
    }

    #[test]
    fn test_list_filters_on_patient_tenancy() {
        let user = AuthenticatedUser::scoped(
            Uuid::from_u128(5),
            "nurse@clinic.test",
            "nurse",
            Tenant::new(Uuid::from_u128(1), Uuid::from_u128(2)),
            Default::default(),
        );

        let sql = list_query(&user, None, Some(QueueStatus::Waiting))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"LEFT JOIN "patient""#), "{sql}");
        assert!(sql.contains(r#""patient"."company_id" = "#), "{sql}");
        assert!(sql.contains(r#""patient"."plant_id" = "#), "{sql}");
        assert!(sql.contains(r#""outpatient_queue"."status" = 'waiting'"#), "{sql}");
    }

    #[test]
    fn test_list_for_super_admin_is_unfiltered() {
        let root = AuthenticatedUser::super_admin(Uuid::from_u128(1), "root@clinic.test");
        let sql = list_query(&root, None, None).build(DbBackend::Postgres).to_string();
        assert!(!sql.contains("WHERE"), "{sql}");
    }

    #[test]
    fn test_department_row_is_locked_for_numbering() {
        let sql = department_for_update(Uuid::from_u128(3))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("FOR UPDATE"), "{sql}");

        let last = last_ticket_query(Uuid::from_u128(3), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())
            .build(DbBackend::Postgres)
            .to_string();
        assert!(last.contains(r#"ORDER BY "outpatient_queue"."queue_number" DESC"#), "{last}");
    }
}
