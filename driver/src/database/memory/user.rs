use kernel::interface::query::UserQuery;
use kernel::interface::update::UserModifier;
use kernel::prelude::entity::{User, UserEmail, UserId, UserStatus};
use kernel::KernelError;

use crate::database::memory::MemoryTransaction;

pub struct MemoryUserRepository;

#[async_trait::async_trait]
impl UserQuery for MemoryUserRepository {
    type Transaction = MemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        Ok(con.state().users.get(id.as_ref()).cloned())
    }

    async fn find_by_email(
        &self,
        con: &mut MemoryTransaction,
        email: &UserEmail,
    ) -> error_stack::Result<Option<User>, KernelError> {
        Ok(con
            .state()
            .users
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }
}

#[async_trait::async_trait]
impl UserModifier for MemoryUserRepository {
    type Transaction = MemoryTransaction;

    async fn create(
        &self,
        con: &mut MemoryTransaction,
        user: &User,
    ) -> error_stack::Result<(), KernelError> {
        con.state_mut()
            .users
            .insert(*user.id().as_ref(), user.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        con: &mut MemoryTransaction,
        id: &UserId,
        status: &UserStatus,
    ) -> error_stack::Result<Option<User>, KernelError> {
        let Some(stored) = con.state_mut().users.get_mut(id.as_ref()) else {
            return Ok(None);
        };
        stored.substitute(|stored| {
            *stored.status = *status;
        });
        Ok(Some(stored.clone()))
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::UserQuery;
    use kernel::interface::update::UserModifier;
    use kernel::prelude::entity::{User, UserEmail, UserId, UserName, UserRole, UserStatus};
    use kernel::KernelError;

    use crate::database::memory::{MemoryDatabase, MemoryUserRepository};

    #[tokio::test]
    async fn lookup_by_email() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut con = db.transact().await?;
        let user = User::new(
            UserId::new(Uuid::new_v4()),
            UserName::new("test"),
            UserEmail::new("test@example.com"),
            UserRole::Member,
            UserStatus::Pending,
        );
        MemoryUserRepository.create(&mut con, &user).await?;

        let found = MemoryUserRepository
            .find_by_email(&mut con, &UserEmail::new("test@example.com"))
            .await?;
        assert_eq!(found, Some(user.clone()));

        let activated = MemoryUserRepository
            .update_status(&mut con, user.id(), &UserStatus::Active)
            .await?
            .unwrap();
        assert_eq!(activated.status(), &UserStatus::Active);
        Ok(())
    }
}
