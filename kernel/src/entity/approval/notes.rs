use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AdminNotes(String);

impl AdminNotes {
    pub fn new(notes: impl Into<String>) -> Self {
        Self(notes.into())
    }
}

impl AsRef<str> for AdminNotes {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<AdminNotes> for String {
    fn from(value: AdminNotes) -> Self {
        value.0
    }
}
