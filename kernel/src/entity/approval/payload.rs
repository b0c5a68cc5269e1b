use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Target of the requested change, when it concerns an existing record.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ResourceId(Uuid);

impl ResourceId {
    pub fn new(id: impl Into<Uuid>) -> Self {
        Self(id.into())
    }
}

impl AsRef<Uuid> for ResourceId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<ResourceId> for Uuid {
    fn from(value: ResourceId) -> Self {
        value.0
    }
}

/// Serialized description of the desired change. Stored and echoed back
/// verbatim; never interpreted by the workflow engine.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RequestData(String);

impl RequestData {
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }
}

impl AsRef<str> for RequestData {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<RequestData> for String {
    fn from(value: RequestData) -> Self {
        value.0
    }
}
