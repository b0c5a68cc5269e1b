mod approval;
mod book;
mod loan;
mod user;

pub use self::{approval::*, book::*, loan::*, user::*};

use kernel::interface::mq::{MessageQueue, QueueInfo};
use kernel::interface::notify::{DependOnNotificationQueue, NotificationJob};

/// Queue submission is best-effort from the domain's point of view: a
/// notification that cannot be queued is logged and dropped, never
/// surfaced as a failure of the operation that produced it.
#[async_trait::async_trait]
pub trait EnqueueNotification: DependOnNotificationQueue {
    async fn enqueue_notification(&self, job: NotificationJob) {
        let info = QueueInfo::from(job);
        if let Err(report) = self.notification_queue().queue(&info).await {
            tracing::warn!("Failed to queue notification {}: {report:?}", info.id());
        }
    }
}

impl<T: ?Sized> EnqueueNotification for T where T: DependOnNotificationQueue {}
