use kernel::interface::query::ApprovalQuery;
use kernel::interface::update::ApprovalModifier;
use kernel::prelude::entity::{ApprovalRequest, ApprovalRequestId, SelectLimit, SelectOffset};
use kernel::KernelError;

use crate::database::memory::MemoryTransaction;

pub struct MemoryApprovalRepository;

#[async_trait::async_trait]
impl ApprovalQuery for MemoryApprovalRepository {
    type Transaction = MemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &ApprovalRequestId,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError> {
        Ok(con.state().approvals.get(id.as_ref()).cloned())
    }

    async fn find_all(
        &self,
        con: &mut MemoryTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<ApprovalRequest>, KernelError> {
        let mut requests: Vec<ApprovalRequest> = con.state().approvals.values().cloned().collect();
        requests.sort_by(|a, b| {
            b.requested_at()
                .as_ref()
                .cmp(a.requested_at().as_ref())
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        let offset = usize::try_from(*offset.as_ref()).unwrap_or(0);
        let limit = usize::try_from(*limit.as_ref()).unwrap_or(0);
        Ok(requests.into_iter().skip(offset).take(limit).collect())
    }
}

#[async_trait::async_trait]
impl ApprovalModifier for MemoryApprovalRepository {
    type Transaction = MemoryTransaction;

    async fn create(
        &self,
        con: &mut MemoryTransaction,
        request: &ApprovalRequest,
    ) -> error_stack::Result<(), KernelError> {
        con.state_mut()
            .approvals
            .insert(*request.id().as_ref(), request.clone());
        Ok(())
    }

    async fn process(
        &self,
        con: &mut MemoryTransaction,
        request: &ApprovalRequest,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError> {
        let Some(stored) = con.state_mut().approvals.get_mut(request.id().as_ref()) else {
            return Ok(None);
        };
        if !stored.is_pending() {
            return Ok(None);
        }
        *stored = request.clone();
        Ok(Some(stored.clone()))
    }

    async fn update(
        &self,
        con: &mut MemoryTransaction,
        request: &ApprovalRequest,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError> {
        let Some(stored) = con.state_mut().approvals.get_mut(request.id().as_ref()) else {
            return Ok(None);
        };
        if !stored.is_pending() {
            return Ok(None);
        }
        stored.substitute(|stored| {
            *stored.request_type = request.request_type().clone();
            *stored.resource_id = request.resource_id().cloned();
            *stored.request_data = request.request_data().clone();
        });
        Ok(Some(stored.clone()))
    }

    async fn delete(
        &self,
        con: &mut MemoryTransaction,
        id: &ApprovalRequestId,
    ) -> error_stack::Result<Option<ApprovalRequestId>, KernelError> {
        let state = con.state_mut();
        let pending = state
            .approvals
            .get(id.as_ref())
            .is_some_and(ApprovalRequest::is_pending);
        if !pending {
            return Ok(None);
        }
        state.approvals.remove(id.as_ref());
        Ok(Some(id.clone()))
    }
}

#[cfg(test)]
mod test {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::update::ApprovalModifier;
    use kernel::prelude::entity::{
        ApprovalRequest, ApprovalRequestId, ApprovalStatus, ProcessedAt, RequestData, RequestType,
        RequestedAt, UserId,
    };
    use kernel::KernelError;

    use crate::database::memory::{MemoryApprovalRepository, MemoryDatabase};

    fn submitted() -> ApprovalRequest {
        ApprovalRequest::submitted(
            ApprovalRequestId::new(Uuid::new_v4()),
            UserId::new(Uuid::new_v4()),
            RequestType::new("book_add"),
            None,
            RequestData::new(r#"{"title":"test"}"#),
            RequestedAt::new(OffsetDateTime::now_utc()),
        )
    }

    #[tokio::test]
    async fn racing_decisions_resolve_to_one() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut con = db.transact().await?;
        let request = submitted();
        MemoryApprovalRepository.create(&mut con, &request).await?;

        let admin = UserId::new(Uuid::new_v4());
        let approved = request.clone().process(
            ApprovalStatus::Approved,
            admin.clone(),
            None,
            ProcessedAt::new(OffsetDateTime::now_utc()),
        )?;
        let rejected = request.process(
            ApprovalStatus::Rejected,
            admin,
            None,
            ProcessedAt::new(OffsetDateTime::now_utc()),
        )?;

        assert!(MemoryApprovalRepository
            .process(&mut con, &approved)
            .await?
            .is_some());
        assert!(MemoryApprovalRepository
            .process(&mut con, &rejected)
            .await?
            .is_none());
        Ok(())
    }

    #[tokio::test]
    async fn decided_requests_cannot_be_withdrawn() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut con = db.transact().await?;
        let request = submitted();
        MemoryApprovalRepository.create(&mut con, &request).await?;

        let decided = request.clone().process(
            ApprovalStatus::Rejected,
            UserId::new(Uuid::new_v4()),
            None,
            ProcessedAt::new(OffsetDateTime::now_utc()),
        )?;
        MemoryApprovalRepository.process(&mut con, &decided).await?;

        let deleted = MemoryApprovalRepository
            .delete(&mut con, request.id())
            .await?;
        assert!(deleted.is_none());
        Ok(())
    }
}
