use serde::{Deserialize, Serialize};

// Borrowers are walk-in identities, not accounts; a loan carries the
// contact details it was opened with.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BorrowerName(String);

impl BorrowerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl AsRef<str> for BorrowerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<BorrowerName> for String {
    fn from(value: BorrowerName) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BorrowerEmail(String);

impl BorrowerEmail {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }
}

impl AsRef<str> for BorrowerEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<BorrowerEmail> for String {
    fn from(value: BorrowerEmail) -> Self {
        value.0
    }
}
