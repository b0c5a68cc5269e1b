use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

const STATUS_PENDING: &str = "pending";
const STATUS_APPROVED: &str = "approved";
const STATUS_REJECTED: &str = "rejected";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ApprovalStatus::Pending)
    }
}

impl AsRef<str> for ApprovalStatus {
    fn as_ref(&self) -> &str {
        match self {
            ApprovalStatus::Pending => STATUS_PENDING,
            ApprovalStatus::Approved => STATUS_APPROVED,
            ApprovalStatus::Rejected => STATUS_REJECTED,
        }
    }
}

impl TryFrom<String> for ApprovalStatus {
    type Error = Report<KernelError>;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match &*value {
            STATUS_PENDING => Ok(ApprovalStatus::Pending),
            STATUS_APPROVED => Ok(ApprovalStatus::Approved),
            STATUS_REJECTED => Ok(ApprovalStatus::Rejected),
            _ => Err(Report::new(KernelError::Internal)
                .attach_printable(format!("Unknown approval status: {value}"))),
        }
    }
}
