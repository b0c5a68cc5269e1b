use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::mq::MessageQueue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

impl Recipient {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Every notification the system can send, as a closed set so workers
/// must handle each kind. Produced by the domain services, delivered
/// at-least-once by whichever queue backend is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationJob {
    Welcome {
        recipient: Recipient,
    },
    LoanConfirmation {
        recipient: Recipient,
        book_title: String,
        due_date: OffsetDateTime,
    },
    OverdueReminder {
        recipient: Recipient,
        book_title: String,
        due_date: OffsetDateTime,
    },
    ReturnConfirmation {
        recipient: Recipient,
        book_title: String,
        overdue: bool,
    },
    BookAvailable {
        recipient: Recipient,
        book_title: String,
    },
    ApprovalDecision {
        recipient: Recipient,
        request_type: String,
        approved: bool,
        admin_notes: Option<String>,
    },
    AccountStatus {
        recipient: Recipient,
        status: String,
    },
}

impl NotificationJob {
    pub fn recipient(&self) -> &Recipient {
        match self {
            NotificationJob::Welcome { recipient }
            | NotificationJob::LoanConfirmation { recipient, .. }
            | NotificationJob::OverdueReminder { recipient, .. }
            | NotificationJob::ReturnConfirmation { recipient, .. }
            | NotificationJob::BookAvailable { recipient, .. }
            | NotificationJob::ApprovalDecision { recipient, .. }
            | NotificationJob::AccountStatus { recipient, .. } => recipient,
        }
    }
}

pub trait DependOnNotificationQueue: 'static + Sync + Send {
    type NotificationQueue: MessageQueue<NotificationJob>;
    fn notification_queue(&self) -> &Self::NotificationQueue;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn jobs_tag_by_kind() {
        let job = NotificationJob::ReturnConfirmation {
            recipient: Recipient::new("jane@example.com", "Jane"),
            book_title: "Dune".to_string(),
            overdue: true,
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["type"], "return_confirmation");
        assert_eq!(value["overdue"], true);
        let parsed: NotificationJob = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, job);
    }

    #[test]
    fn recipient_is_reachable_on_every_kind() {
        let recipient = Recipient::new("admin@example.com", "Admin");
        let job = NotificationJob::AccountStatus {
            recipient: recipient.clone(),
            status: "active".to_string(),
        };
        assert_eq!(job.recipient(), &recipient);
    }
}
