use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ApprovalRequestId(Uuid);

impl ApprovalRequestId {
    pub fn new(id: impl Into<Uuid>) -> Self {
        Self(id.into())
    }
}

impl AsRef<Uuid> for ApprovalRequestId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<ApprovalRequestId> for Uuid {
    fn from(value: ApprovalRequestId) -> Self {
        value.0
    }
}
