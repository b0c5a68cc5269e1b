use driver::database::{MemoryMessageQueue, RedisDatabase, RedisMessageQueue};
use error_stack::Report;
use kernel::interface::mq::{
    ErrorOperation, ErroredInfo, MQConfig, MessageQueue, QueueInfo, QueueStats,
};
use kernel::interface::notify::NotificationJob;
use kernel::KernelError;
use tracing::info;
use uuid::Uuid;

static NOTIFY_QUEUE: &str = "NOTIFY_QUEUE";
static NOTIFICATION_STREAM: &str = "notification_worker";

/// Delivery stand-in: notifications are rendered to the log. A real
/// mailer slots in here without touching the queue contract.
async fn deliver(job: NotificationJob) -> error_stack::Result<(), ErrorOperation> {
    match job {
        NotificationJob::Welcome { recipient } => {
            info!("[welcome] {} <{}>", recipient.name, recipient.email);
        }
        NotificationJob::LoanConfirmation {
            recipient,
            book_title,
            due_date,
        } => {
            info!(
                "[loan confirmation] \"{book_title}\" to {} <{}>, due {due_date}",
                recipient.name, recipient.email
            );
        }
        NotificationJob::OverdueReminder {
            recipient,
            book_title,
            due_date,
        } => {
            info!(
                "[overdue reminder] \"{book_title}\" to {} <{}>, was due {due_date}",
                recipient.name, recipient.email
            );
        }
        NotificationJob::ReturnConfirmation {
            recipient,
            book_title,
            overdue,
        } => {
            info!(
                "[return confirmation] \"{book_title}\" from {} <{}>, overdue: {overdue}",
                recipient.name, recipient.email
            );
        }
        NotificationJob::BookAvailable {
            recipient,
            book_title,
        } => {
            info!(
                "[book available] \"{book_title}\" for {} <{}>",
                recipient.name, recipient.email
            );
        }
        NotificationJob::ApprovalDecision {
            recipient,
            request_type,
            approved,
            admin_notes,
        } => {
            info!(
                "[approval decision] {request_type} for {} <{}>, approved: {approved}, notes: {admin_notes:?}",
                recipient.name, recipient.email
            );
        }
        NotificationJob::AccountStatus { recipient, status } => {
            info!(
                "[account status] {} <{}> is now {status}",
                recipient.name, recipient.email
            );
        }
    }
    Ok(())
}

/// Queue backend behind the notification dispatcher, picked once at
/// startup. Redis is the default; `NOTIFY_QUEUE=memory` keeps jobs
/// in-process for single-node setups.
pub enum NotificationQueue {
    Redis(RedisMessageQueue<NotificationJob>),
    Memory(MemoryMessageQueue<NotificationJob>),
}

impl NotificationQueue {
    pub fn init() -> error_stack::Result<Self, KernelError> {
        let config = MQConfig::default();
        let backend = dotenvy::var(NOTIFY_QUEUE).unwrap_or_else(|_| "redis".to_string());
        match backend.as_str() {
            "redis" => {
                let db = RedisDatabase::new()?;
                Ok(Self::Redis(RedisMessageQueue::new(
                    db,
                    NOTIFICATION_STREAM,
                    config,
                    |job| Box::pin(deliver(job)),
                )))
            }
            "memory" => Ok(Self::Memory(MemoryMessageQueue::new(config, |job| {
                Box::pin(deliver(job))
            }))),
            other => Err(Report::new(KernelError::Internal)
                .attach_printable(format!("Unknown queue backend `{other}`"))),
        }
    }
}

#[async_trait::async_trait]
impl MessageQueue<NotificationJob> for NotificationQueue {
    fn start_workers(&self) {
        match self {
            Self::Redis(queue) => queue.start_workers(),
            Self::Memory(queue) => queue.start_workers(),
        }
    }

    async fn queue(&self, info: &QueueInfo<NotificationJob>) -> error_stack::Result<(), KernelError> {
        match self {
            Self::Redis(queue) => queue.queue(info).await,
            Self::Memory(queue) => queue.queue(info).await,
        }
    }

    async fn stats(&self) -> error_stack::Result<QueueStats, KernelError> {
        match self {
            Self::Redis(queue) => queue.stats().await,
            Self::Memory(queue) => queue.stats().await,
        }
    }

    async fn get_delayed_infos(
        &self,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<ErroredInfo<NotificationJob>>, KernelError> {
        match self {
            Self::Redis(queue) => queue.get_delayed_infos(size, offset).await,
            Self::Memory(queue) => queue.get_delayed_infos(size, offset).await,
        }
    }

    async fn get_delayed_info(
        &self,
        id: &Uuid,
    ) -> error_stack::Result<Option<ErroredInfo<NotificationJob>>, KernelError> {
        match self {
            Self::Redis(queue) => queue.get_delayed_info(id).await,
            Self::Memory(queue) => queue.get_delayed_info(id).await,
        }
    }

    async fn get_failed_infos(
        &self,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<ErroredInfo<NotificationJob>>, KernelError> {
        match self {
            Self::Redis(queue) => queue.get_failed_infos(size, offset).await,
            Self::Memory(queue) => queue.get_failed_infos(size, offset).await,
        }
    }

    async fn get_failed_info(
        &self,
        id: &Uuid,
    ) -> error_stack::Result<Option<ErroredInfo<NotificationJob>>, KernelError> {
        match self {
            Self::Redis(queue) => queue.get_failed_info(id).await,
            Self::Memory(queue) => queue.get_failed_info(id).await,
        }
    }

    async fn retry(&self, id: &Uuid) -> error_stack::Result<bool, KernelError> {
        match self {
            Self::Redis(queue) => queue.retry(id).await,
            Self::Memory(queue) => queue.retry(id).await,
        }
    }

    async fn remove(&self, id: &Uuid) -> error_stack::Result<bool, KernelError> {
        match self {
            Self::Redis(queue) => queue.remove(id).await,
            Self::Memory(queue) => queue.remove(id).await,
        }
    }

    async fn clean(&self) -> error_stack::Result<u64, KernelError> {
        match self {
            Self::Redis(queue) => queue.clean().await,
            Self::Memory(queue) => queue.clean().await,
        }
    }
}
