use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

const ROLE_ADMIN: &str = "admin";
const ROLE_MEMBER: &str = "member";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Member,
}

impl AsRef<str> for UserRole {
    fn as_ref(&self) -> &str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::Member => ROLE_MEMBER,
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = Report<KernelError>;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match &*value {
            ROLE_ADMIN => Ok(UserRole::Admin),
            ROLE_MEMBER => Ok(UserRole::Member),
            _ => Err(Report::new(KernelError::Validation)
                .attach_printable(format!("Unknown user role: {value}"))),
        }
    }
}
