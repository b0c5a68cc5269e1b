use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new(id: impl Into<Uuid>) -> Self {
        Self(id.into())
    }
}

impl AsRef<Uuid> for BookId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<BookId> for Uuid {
    fn from(value: BookId) -> Self {
        value.0
    }
}
