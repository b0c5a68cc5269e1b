use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

const STATUS_PENDING: &str = "pending";
const STATUS_ACTIVE: &str = "active";
const STATUS_SUSPENDED: &str = "suspended";

/// Accounts start `pending` until their registration request is
/// approved and an admin activates them.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Pending,
    Active,
    Suspended,
}

impl AsRef<str> for UserStatus {
    fn as_ref(&self) -> &str {
        match self {
            UserStatus::Pending => STATUS_PENDING,
            UserStatus::Active => STATUS_ACTIVE,
            UserStatus::Suspended => STATUS_SUSPENDED,
        }
    }
}

impl TryFrom<String> for UserStatus {
    type Error = Report<KernelError>;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match &*value {
            STATUS_PENDING => Ok(UserStatus::Pending),
            STATUS_ACTIVE => Ok(UserStatus::Active),
            STATUS_SUSPENDED => Ok(UserStatus::Suspended),
            _ => Err(Report::new(KernelError::Validation)
                .attach_printable(format!("Unknown user status: {value}"))),
        }
    }
}
