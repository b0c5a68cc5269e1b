use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LoanNotes(String);

impl LoanNotes {
    pub fn new(notes: impl Into<String>) -> Self {
        Self(notes.into())
    }
}

impl AsRef<str> for LoanNotes {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<LoanNotes> for String {
    fn from(value: LoanNotes) -> Self {
        value.0
    }
}
