use error_stack::Report;
use sqlx::types::Uuid;
use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::ApprovalQuery;
use kernel::interface::update::ApprovalModifier;
use kernel::prelude::entity::{
    AdminNotes, ApprovalRequest, ApprovalRequestId, ApprovalStatus, ProcessedAt, RequestData,
    RequestType, RequestedAt, ResourceId, SelectLimit, SelectOffset, UserId,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresApprovalRepository;

#[async_trait::async_trait]
impl ApprovalQuery for PostgresApprovalRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &ApprovalRequestId,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError> {
        PgApprovalInternal::find_by_id(con.connection(), id).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<ApprovalRequest>, KernelError> {
        PgApprovalInternal::find_all(con.connection(), limit, offset).await
    }
}

#[async_trait::async_trait]
impl ApprovalModifier for PostgresApprovalRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        request: &ApprovalRequest,
    ) -> error_stack::Result<(), KernelError> {
        PgApprovalInternal::create(con.connection(), request).await
    }

    async fn process(
        &self,
        con: &mut PostgresTransaction,
        request: &ApprovalRequest,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError> {
        PgApprovalInternal::process(con.connection(), request).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        request: &ApprovalRequest,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError> {
        PgApprovalInternal::update(con.connection(), request).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        id: &ApprovalRequestId,
    ) -> error_stack::Result<Option<ApprovalRequestId>, KernelError> {
        PgApprovalInternal::delete(con.connection(), id).await
    }
}

#[derive(sqlx::FromRow)]
struct ApprovalRow {
    id: Uuid,
    user_id: Uuid,
    request_type: String,
    resource_id: Option<Uuid>,
    request_data: String,
    status: String,
    admin_id: Option<Uuid>,
    admin_notes: Option<String>,
    requested_at: OffsetDateTime,
    processed_at: Option<OffsetDateTime>,
}

impl TryFrom<ApprovalRow> for ApprovalRequest {
    type Error = Report<KernelError>;
    fn try_from(row: ApprovalRow) -> Result<Self, Self::Error> {
        Ok(ApprovalRequest::new(
            ApprovalRequestId::new(row.id),
            UserId::new(row.user_id),
            RequestType::new(row.request_type),
            row.resource_id.map(ResourceId::new),
            RequestData::new(row.request_data),
            ApprovalStatus::try_from(row.status)?,
            row.admin_id.map(UserId::new),
            row.admin_notes.map(AdminNotes::new),
            RequestedAt::new(row.requested_at),
            row.processed_at.map(ProcessedAt::new),
        ))
    }
}

pub(in crate::database) struct PgApprovalInternal;

impl PgApprovalInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &ApprovalRequestId,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError> {
        let row = sqlx::query_as::<_, ApprovalRow>(
            // language=postgresql
            r#"
            SELECT id, user_id, request_type, resource_id, request_data, status,
                   admin_id, admin_notes, requested_at, processed_at
            FROM approval_requests
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(ApprovalRequest::try_from).transpose()
    }

    async fn find_all(
        con: &mut PgConnection,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<ApprovalRequest>, KernelError> {
        let rows = sqlx::query_as::<_, ApprovalRow>(
            // language=postgresql
            r#"
            SELECT id, user_id, request_type, resource_id, request_data, status,
                   admin_id, admin_notes, requested_at, processed_at
            FROM approval_requests
            ORDER BY requested_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit.as_ref())
        .bind(offset.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(ApprovalRequest::try_from).collect()
    }

    async fn create(
        con: &mut PgConnection,
        request: &ApprovalRequest,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO approval_requests (id, user_id, request_type, resource_id, request_data,
                                           status, admin_id, admin_notes, requested_at, processed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(request.id().as_ref())
        .bind(request.user_id().as_ref())
        .bind(request.request_type().as_ref())
        .bind(request.resource_id().map(|resource| resource.as_ref()))
        .bind(request.request_data().as_ref())
        .bind(request.status().as_ref())
        .bind(request.admin_id().map(|admin| admin.as_ref()))
        .bind(request.admin_notes().map(|notes| notes.as_ref()))
        .bind(request.requested_at().as_ref())
        .bind(request.processed_at().map(|processed| processed.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn process(
        con: &mut PgConnection,
        request: &ApprovalRequest,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError> {
        let row = sqlx::query_as::<_, ApprovalRow>(
            // language=postgresql
            r#"
            UPDATE approval_requests
            SET status = $2, admin_id = $3, admin_notes = $4, processed_at = $5
            WHERE id = $1 AND status = 'pending'
            RETURNING id, user_id, request_type, resource_id, request_data, status,
                      admin_id, admin_notes, requested_at, processed_at
            "#,
        )
        .bind(request.id().as_ref())
        .bind(request.status().as_ref())
        .bind(request.admin_id().map(|admin| admin.as_ref()))
        .bind(request.admin_notes().map(|notes| notes.as_ref()))
        .bind(request.processed_at().map(|processed| processed.as_ref()))
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(ApprovalRequest::try_from).transpose()
    }

    async fn update(
        con: &mut PgConnection,
        request: &ApprovalRequest,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError> {
        let row = sqlx::query_as::<_, ApprovalRow>(
            // language=postgresql
            r#"
            UPDATE approval_requests
            SET request_type = $2, resource_id = $3, request_data = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING id, user_id, request_type, resource_id, request_data, status,
                      admin_id, admin_notes, requested_at, processed_at
            "#,
        )
        .bind(request.id().as_ref())
        .bind(request.request_type().as_ref())
        .bind(request.resource_id().map(|resource| resource.as_ref()))
        .bind(request.request_data().as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(ApprovalRequest::try_from).transpose()
    }

    async fn delete(
        con: &mut PgConnection,
        id: &ApprovalRequestId,
    ) -> error_stack::Result<Option<ApprovalRequestId>, KernelError> {
        let deleted = sqlx::query_scalar::<_, Uuid>(
            // language=postgresql
            r#"
            DELETE FROM approval_requests
            WHERE id = $1 AND status = 'pending'
            RETURNING id
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(deleted.map(ApprovalRequestId::new))
    }
}

#[cfg(test)]
mod test {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::ApprovalQuery;
    use kernel::interface::update::{ApprovalModifier, UserModifier};
    use kernel::prelude::entity::{
        ApprovalRequest, ApprovalRequestId, ApprovalStatus, ProcessedAt, RequestData, RequestType,
        RequestedAt, User, UserEmail, UserId, UserName, UserRole, UserStatus,
    };
    use kernel::KernelError;

    use crate::database::postgres::approval::PostgresApprovalRepository;
    use crate::database::postgres::user::PostgresUserRepository;
    use crate::database::postgres::{PostgresDatabase, PostgresTransaction};

    async fn seed_user(
        con: &mut PostgresTransaction,
        role: UserRole,
    ) -> error_stack::Result<UserId, KernelError> {
        let id = UserId::new(Uuid::new_v4());
        let user = User::new(
            id.clone(),
            UserName::new("test"),
            UserEmail::new(format!("{}@example.com", Uuid::new_v4())),
            role,
            UserStatus::Active,
        );
        PostgresUserRepository.create(con, &user).await?;
        Ok(id)
    }

    fn submitted(user_id: &UserId) -> ApprovalRequest {
        ApprovalRequest::submitted(
            ApprovalRequestId::new(Uuid::new_v4()),
            user_id.clone(),
            RequestType::new("book_add"),
            None,
            RequestData::new(r#"{"title":"test"}"#),
            RequestedAt::new(OffsetDateTime::now_utc()),
        )
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn decision_applies_once() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let requester = seed_user(&mut con, UserRole::Member).await?;
        let admin = seed_user(&mut con, UserRole::Admin).await?;

        let request = submitted(&requester);
        PostgresApprovalRepository.create(&mut con, &request).await?;

        let approved = request.clone().process(
            ApprovalStatus::Approved,
            admin.clone(),
            None,
            ProcessedAt::new(OffsetDateTime::now_utc()),
        )?;
        let stored = PostgresApprovalRepository
            .process(&mut con, &approved)
            .await?;
        assert_eq!(stored.as_ref().map(|r| r.status()), Some(&ApprovalStatus::Approved));

        // A racing second decision loses against the stored status.
        let rejected = request.process(
            ApprovalStatus::Rejected,
            admin,
            None,
            ProcessedAt::new(OffsetDateTime::now_utc()),
        )?;
        let stored = PostgresApprovalRepository
            .process(&mut con, &rejected)
            .await?;
        assert!(stored.is_none());

        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn pending_rows_can_be_edited_and_withdrawn() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let requester = seed_user(&mut con, UserRole::Member).await?;

        let request = submitted(&requester);
        PostgresApprovalRepository.create(&mut con, &request).await?;

        let mut edited = request.clone();
        edited.substitute(|r| *r.request_data = RequestData::new(r#"{"title":"revised"}"#));
        let stored = PostgresApprovalRepository.update(&mut con, &edited).await?;
        assert_eq!(
            stored.as_ref().map(|r| r.request_data()),
            Some(edited.request_data())
        );

        let deleted = PostgresApprovalRepository
            .delete(&mut con, request.id())
            .await?;
        assert_eq!(deleted, Some(request.id().clone()));

        let found = PostgresApprovalRepository
            .find_by_id(&mut con, request.id())
            .await?;
        assert!(found.is_none());

        Ok(())
    }
}
