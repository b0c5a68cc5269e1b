use error_stack::Report;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::notify::{DependOnNotificationQueue, NotificationJob, Recipient};
use kernel::interface::query::{DependOnUserQuery, UserQuery};
use kernel::interface::update::{
    ApprovalModifier, DependOnApprovalModifier, DependOnUserModifier, UserModifier,
};
use kernel::prelude::entity::{
    Actor, ApprovalRequest, ApprovalRequestId, RequestData, RequestType, RequestedAt, User,
    UserId, UserStatus,
};
use kernel::KernelError;

use crate::service::EnqueueNotification;
use crate::transfer::{GetUserDto, RegisterUserDto, SetUserStatusDto, UserDto};

#[async_trait::async_trait]
pub trait UserService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnUserQuery
    + DependOnUserModifier
    + DependOnApprovalModifier
    + DependOnNotificationQueue
{
    /// Registration is approval-gated: the account row and its
    /// `user_registration` request land in one transaction, and the
    /// account stays `pending` until an admin activates it.
    async fn register_user(
        &self,
        dto: RegisterUserDto,
    ) -> error_stack::Result<UserDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        if self
            .user_query()
            .find_by_email(&mut connection, &dto.email)
            .await?
            .is_some()
        {
            return Err(Report::new(KernelError::Conflict).attach_printable(format!(
                "Email {} is already registered",
                dto.email.as_ref()
            )));
        }

        let user = User::new(
            UserId::new(Uuid::new_v4()),
            dto.name,
            dto.email,
            dto.role,
            UserStatus::Pending,
        );
        self.user_modifier().create(&mut connection, &user).await?;

        let request_data = serde_json::json!({
            "name": user.name().as_ref(),
            "email": user.email().as_ref(),
        })
        .to_string();
        let request = ApprovalRequest::submitted(
            ApprovalRequestId::new(Uuid::new_v4()),
            user.id().clone(),
            RequestType::new("user_registration"),
            None,
            RequestData::new(request_data),
            RequestedAt::new(OffsetDateTime::now_utc()),
        );
        self.approval_modifier()
            .create(&mut connection, &request)
            .await?;

        connection.commit().await?;

        self.enqueue_notification(NotificationJob::Welcome {
            recipient: Recipient::new(user.email().as_ref(), user.name().as_ref()),
        })
        .await;

        Ok(UserDto::from(user))
    }

    async fn set_user_status(
        &self,
        actor: &Actor,
        dto: SetUserStatusDto,
    ) -> error_stack::Result<UserDto, KernelError> {
        if !actor.is_admin() {
            return Err(Report::new(KernelError::Forbidden)
                .attach_printable("Only admins change account status"));
        }

        let mut connection = self.database_connection().transact().await?;

        let user = self
            .user_modifier()
            .update_status(&mut connection, &dto.id, &dto.status)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("User {} does not exist", dto.id.as_ref()))
            })?;

        connection.commit().await?;

        self.enqueue_notification(NotificationJob::AccountStatus {
            recipient: Recipient::new(user.email().as_ref(), user.name().as_ref()),
            status: user.status().as_ref().to_string(),
        })
        .await;

        Ok(UserDto::from(user))
    }

    async fn get_user(&self, dto: GetUserDto) -> error_stack::Result<Option<UserDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let user = self
            .user_query()
            .find_by_id(&mut connection, &dto.id)
            .await?;
        connection.commit().await?;
        Ok(user.map(UserDto::from))
    }
}

impl<T> UserService for T where
    T: DependOnUserQuery
        + DependOnUserModifier
        + DependOnApprovalModifier
        + DependOnNotificationQueue
{
}
