use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestedAt(OffsetDateTime);

impl RequestedAt {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into())
    }
}

impl AsRef<OffsetDateTime> for RequestedAt {
    fn as_ref(&self) -> &OffsetDateTime {
        &self.0
    }
}

impl From<RequestedAt> for OffsetDateTime {
    fn from(value: RequestedAt) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessedAt(OffsetDateTime);

impl ProcessedAt {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into())
    }
}

impl AsRef<OffsetDateTime> for ProcessedAt {
    fn as_ref(&self) -> &OffsetDateTime {
        &self.0
    }
}

impl From<ProcessedAt> for OffsetDateTime {
    fn from(value: ProcessedAt) -> Self {
        value.0
    }
}
