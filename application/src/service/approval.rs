use error_stack::Report;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::notify::{DependOnNotificationQueue, NotificationJob, Recipient};
use kernel::interface::query::{ApprovalQuery, DependOnApprovalQuery, DependOnUserQuery, UserQuery};
use kernel::interface::update::{ApprovalModifier, DependOnApprovalModifier};
use kernel::prelude::entity::{
    Actor, ApprovalRequest, ApprovalRequestId, ApprovalStatus, ProcessedAt, RequestedAt,
};
use kernel::KernelError;

use crate::service::EnqueueNotification;
use crate::transfer::{
    ApprovalRequestDto, DecideApprovalDto, DeleteApprovalDto, GetAllApprovalDto, GetApprovalDto,
    SubmitApprovalDto, UpdateApprovalDto,
};

/// Approval workflow. A request belongs to its submitter until an admin
/// decides it; the decision itself is a compare-and-swap on the pending
/// status, so racing admins resolve to exactly one decision.
#[async_trait::async_trait]
pub trait ApprovalService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnApprovalQuery
    + DependOnApprovalModifier
    + DependOnUserQuery
    + DependOnNotificationQueue
{
    async fn submit_request(
        &self,
        actor: &Actor,
        dto: SubmitApprovalDto,
    ) -> error_stack::Result<ApprovalRequestDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let requester = self
            .user_query()
            .find_by_id(&mut connection, actor.user_id())
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("User {} does not exist", actor.user_id().as_ref()))
            })?;

        let request = ApprovalRequest::submitted(
            ApprovalRequestId::new(Uuid::new_v4()),
            requester.id().clone(),
            dto.request_type,
            dto.resource_id,
            dto.request_data,
            RequestedAt::new(OffsetDateTime::now_utc()),
        );
        self.approval_modifier()
            .create(&mut connection, &request)
            .await?;

        connection.commit().await?;
        Ok(ApprovalRequestDto::from(request))
    }

    async fn approve_request(
        &self,
        actor: &Actor,
        dto: DecideApprovalDto,
    ) -> error_stack::Result<ApprovalRequestDto, KernelError> {
        self.decide_request(actor, dto, ApprovalStatus::Approved)
            .await
    }

    async fn reject_request(
        &self,
        actor: &Actor,
        dto: DecideApprovalDto,
    ) -> error_stack::Result<ApprovalRequestDto, KernelError> {
        self.decide_request(actor, dto, ApprovalStatus::Rejected)
            .await
    }

    async fn decide_request(
        &self,
        actor: &Actor,
        dto: DecideApprovalDto,
        status: ApprovalStatus,
    ) -> error_stack::Result<ApprovalRequestDto, KernelError> {
        if !actor.is_admin() {
            return Err(Report::new(KernelError::Forbidden)
                .attach_printable("Only admins decide approval requests"));
        }

        let mut connection = self.database_connection().transact().await?;

        let request = self
            .approval_query()
            .find_by_id(&mut connection, &dto.id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("Request {} does not exist", dto.id.as_ref()))
            })?;

        let decided = request.process(
            status,
            actor.user_id().clone(),
            dto.admin_notes,
            ProcessedAt::new(OffsetDateTime::now_utc()),
        )?;

        let stored = self
            .approval_modifier()
            .process(&mut connection, &decided)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::InvalidState).attach_printable(format!(
                    "Request {} was decided by another admin",
                    dto.id.as_ref()
                ))
            })?;

        let requester = self
            .user_query()
            .find_by_id(&mut connection, stored.user_id())
            .await?;

        connection.commit().await?;

        if let Some(requester) = requester {
            self.enqueue_notification(NotificationJob::ApprovalDecision {
                recipient: Recipient::new(requester.email().as_ref(), requester.name().as_ref()),
                request_type: stored.request_type().as_ref().to_string(),
                approved: matches!(stored.status(), ApprovalStatus::Approved),
                admin_notes: stored.admin_notes().map(|notes| notes.as_ref().to_string()),
            })
            .await;
        }

        Ok(ApprovalRequestDto::from(stored))
    }

    async fn update_request(
        &self,
        actor: &Actor,
        dto: UpdateApprovalDto,
    ) -> error_stack::Result<ApprovalRequestDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let request = self
            .approval_query()
            .find_by_id(&mut connection, &dto.id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("Request {} does not exist", dto.id.as_ref()))
            })?;

        if request.user_id() != actor.user_id() && !actor.is_admin() {
            return Err(Report::new(KernelError::Forbidden).attach_printable(format!(
                "User {} does not own request {}",
                actor.user_id().as_ref(),
                dto.id.as_ref()
            )));
        }
        if !request.is_pending() {
            return Err(Report::new(KernelError::InvalidState).attach_printable(format!(
                "Request {} is already {}",
                dto.id.as_ref(),
                request.status().as_ref()
            )));
        }

        let mut updated = request;
        updated.substitute(|r| {
            *r.request_type = dto.request_type;
            *r.resource_id = dto.resource_id;
            *r.request_data = dto.request_data;
        });

        let stored = self
            .approval_modifier()
            .update(&mut connection, &updated)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::InvalidState).attach_printable(format!(
                    "Request {} was decided concurrently",
                    updated.id().as_ref()
                ))
            })?;

        connection.commit().await?;
        Ok(ApprovalRequestDto::from(stored))
    }

    async fn delete_request(
        &self,
        actor: &Actor,
        dto: DeleteApprovalDto,
    ) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let request = self
            .approval_query()
            .find_by_id(&mut connection, &dto.id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("Request {} does not exist", dto.id.as_ref()))
            })?;

        if request.user_id() != actor.user_id() && !actor.is_admin() {
            return Err(Report::new(KernelError::Forbidden).attach_printable(format!(
                "User {} does not own request {}",
                actor.user_id().as_ref(),
                dto.id.as_ref()
            )));
        }

        if self
            .approval_modifier()
            .delete(&mut connection, &dto.id)
            .await?
            .is_none()
        {
            return Err(Report::new(KernelError::InvalidState).attach_printable(format!(
                "Request {} is already {}",
                dto.id.as_ref(),
                request.status().as_ref()
            )));
        }

        connection.commit().await?;
        Ok(())
    }

    async fn get_request(
        &self,
        dto: GetApprovalDto,
    ) -> error_stack::Result<Option<ApprovalRequestDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let request = self
            .approval_query()
            .find_by_id(&mut connection, &dto.id)
            .await?;
        connection.commit().await?;
        Ok(request.map(ApprovalRequestDto::from))
    }

    async fn list_requests(
        &self,
        dto: GetAllApprovalDto,
    ) -> error_stack::Result<Vec<ApprovalRequestDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let requests = self
            .approval_query()
            .find_all(&mut connection, &dto.limit, &dto.offset)
            .await?;
        connection.commit().await?;
        Ok(requests.into_iter().map(ApprovalRequestDto::from).collect())
    }
}

impl<T> ApprovalService for T where
    T: DependOnApprovalQuery
        + DependOnApprovalModifier
        + DependOnUserQuery
        + DependOnNotificationQueue
{
}
