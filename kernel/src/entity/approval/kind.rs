use serde::{Deserialize, Serialize};

/// Tag naming what kind of change is being requested, e.g.
/// `user_registration` or `book_add`. The workflow engine treats it as
/// opaque; consumers route on it.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RequestType(String);

impl RequestType {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }
}

impl AsRef<str> for RequestType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<RequestType> for String {
    fn from(value: RequestType) -> Self {
        value.0
    }
}
