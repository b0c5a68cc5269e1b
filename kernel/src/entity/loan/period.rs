use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorrowedAt(OffsetDateTime);

impl BorrowedAt {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into())
    }
}

impl AsRef<OffsetDateTime> for BorrowedAt {
    fn as_ref(&self) -> &OffsetDateTime {
        &self.0
    }
}

impl From<BorrowedAt> for OffsetDateTime {
    fn from(value: BorrowedAt) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DueDate(OffsetDateTime);

impl DueDate {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into())
    }
}

impl AsRef<OffsetDateTime> for DueDate {
    fn as_ref(&self) -> &OffsetDateTime {
        &self.0
    }
}

impl From<DueDate> for OffsetDateTime {
    fn from(value: DueDate) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReturnedAt(OffsetDateTime);

impl ReturnedAt {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into())
    }
}

impl AsRef<OffsetDateTime> for ReturnedAt {
    fn as_ref(&self) -> &OffsetDateTime {
        &self.0
    }
}

impl From<ReturnedAt> for OffsetDateTime {
    fn from(value: ReturnedAt) -> Self {
        value.0
    }
}
