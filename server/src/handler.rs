use std::ops::Deref;
use std::sync::Arc;

use driver::database::{
    PostgresApprovalRepository, PostgresBookRepository, PostgresDatabase, PostgresLoanRepository,
    PostgresUserRepository,
};
use kernel::interface::database::DependOnDatabaseConnection;
use kernel::interface::notify::DependOnNotificationQueue;
use kernel::interface::query::{
    DependOnApprovalQuery, DependOnBookQuery, DependOnLoanQuery, DependOnUserQuery,
};
use kernel::interface::update::{
    DependOnApprovalModifier, DependOnBookModifier, DependOnLoanModifier, DependOnUserModifier,
};
use kernel::KernelError;

use crate::mq::NotificationQueue;

#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        Ok(Self(Arc::new(Handler::init().await?)))
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

/// Concrete wiring of the dependency traits: Postgres for state, the
/// configured queue backend for notifications. The service traits attach
/// through their blanket impls, so routes call operations directly on
/// this type.
pub struct Handler {
    database: PostgresDatabase,
    notification: NotificationQueue,
}

impl Handler {
    pub async fn init() -> error_stack::Result<Self, KernelError> {
        let database = PostgresDatabase::new().await?;
        let notification = NotificationQueue::init()?;

        Ok(Self {
            database,
            notification,
        })
    }

    pub fn notification(&self) -> &NotificationQueue {
        &self.notification
    }
}

impl DependOnDatabaseConnection for Handler {
    type DatabaseConnection = PostgresDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.database
    }
}

impl DependOnBookQuery for Handler {
    type BookQuery = PostgresBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &PostgresBookRepository
    }
}

impl DependOnBookModifier for Handler {
    type BookModifier = PostgresBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &PostgresBookRepository
    }
}

impl DependOnLoanQuery for Handler {
    type LoanQuery = PostgresLoanRepository;
    fn loan_query(&self) -> &Self::LoanQuery {
        &PostgresLoanRepository
    }
}

impl DependOnLoanModifier for Handler {
    type LoanModifier = PostgresLoanRepository;
    fn loan_modifier(&self) -> &Self::LoanModifier {
        &PostgresLoanRepository
    }
}

impl DependOnApprovalQuery for Handler {
    type ApprovalQuery = PostgresApprovalRepository;
    fn approval_query(&self) -> &Self::ApprovalQuery {
        &PostgresApprovalRepository
    }
}

impl DependOnApprovalModifier for Handler {
    type ApprovalModifier = PostgresApprovalRepository;
    fn approval_modifier(&self) -> &Self::ApprovalModifier {
        &PostgresApprovalRepository
    }
}

impl DependOnUserQuery for Handler {
    type UserQuery = PostgresUserRepository;
    fn user_query(&self) -> &Self::UserQuery {
        &PostgresUserRepository
    }
}

impl DependOnUserModifier for Handler {
    type UserModifier = PostgresUserRepository;
    fn user_modifier(&self) -> &Self::UserModifier {
        &PostgresUserRepository
    }
}

impl DependOnNotificationQueue for Handler {
    type NotificationQueue = NotificationQueue;
    fn notification_queue(&self) -> &Self::NotificationQueue {
        &self.notification
    }
}
