use std::sync::{Arc, Mutex};

use driver::database::{
    MemoryApprovalRepository, MemoryBookRepository, MemoryDatabase, MemoryLoanRepository,
    MemoryMessageQueue, MemoryUserRepository,
};
use kernel::interface::database::DependOnDatabaseConnection;
use kernel::interface::mq::MQConfig;
use kernel::interface::notify::{DependOnNotificationQueue, NotificationJob};
use kernel::interface::query::{
    DependOnApprovalQuery, DependOnBookQuery, DependOnLoanQuery, DependOnUserQuery,
};
use kernel::interface::update::{
    DependOnApprovalModifier, DependOnBookModifier, DependOnLoanModifier, DependOnUserModifier,
};

pub type DeliveredJobs = Arc<Mutex<Vec<NotificationJob>>>;

/// Service module over the in-process backends.
pub struct TestModule {
    database: MemoryDatabase,
    queue: MemoryMessageQueue<NotificationJob>,
}

impl TestModule {
    /// Every delivered notification lands in the returned vec so tests
    /// can assert on dispatch.
    pub fn build() -> (Self, DeliveredJobs) {
        let delivered: DeliveredJobs = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);
        let queue = MemoryMessageQueue::new(MQConfig::default(), move |job: NotificationJob| {
            let sink = Arc::clone(&sink);
            Box::pin(async move {
                sink.lock().unwrap().push(job);
                Ok(())
            })
        });
        let module = Self {
            database: MemoryDatabase::new(),
            queue,
        };
        (module, delivered)
    }
}

impl DependOnDatabaseConnection for TestModule {
    type DatabaseConnection = MemoryDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.database
    }
}

impl DependOnBookQuery for TestModule {
    type BookQuery = MemoryBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &MemoryBookRepository
    }
}

impl DependOnBookModifier for TestModule {
    type BookModifier = MemoryBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &MemoryBookRepository
    }
}

impl DependOnLoanQuery for TestModule {
    type LoanQuery = MemoryLoanRepository;
    fn loan_query(&self) -> &Self::LoanQuery {
        &MemoryLoanRepository
    }
}

impl DependOnLoanModifier for TestModule {
    type LoanModifier = MemoryLoanRepository;
    fn loan_modifier(&self) -> &Self::LoanModifier {
        &MemoryLoanRepository
    }
}

impl DependOnApprovalQuery for TestModule {
    type ApprovalQuery = MemoryApprovalRepository;
    fn approval_query(&self) -> &Self::ApprovalQuery {
        &MemoryApprovalRepository
    }
}

impl DependOnApprovalModifier for TestModule {
    type ApprovalModifier = MemoryApprovalRepository;
    fn approval_modifier(&self) -> &Self::ApprovalModifier {
        &MemoryApprovalRepository
    }
}

impl DependOnUserQuery for TestModule {
    type UserQuery = MemoryUserRepository;
    fn user_query(&self) -> &Self::UserQuery {
        &MemoryUserRepository
    }
}

impl DependOnUserModifier for TestModule {
    type UserModifier = MemoryUserRepository;
    fn user_modifier(&self) -> &Self::UserModifier {
        &MemoryUserRepository
    }
}

impl DependOnNotificationQueue for TestModule {
    type NotificationQueue = MemoryMessageQueue<NotificationJob>;
    fn notification_queue(&self) -> &Self::NotificationQueue {
        &self.queue
    }
}
