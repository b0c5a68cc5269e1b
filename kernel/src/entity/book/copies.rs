use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AvailableCopies(i32);

impl AvailableCopies {
    pub fn new(copies: impl Into<i32>) -> Self {
        Self(copies.into())
    }
}

impl AsRef<i32> for AvailableCopies {
    fn as_ref(&self) -> &i32 {
        &self.0
    }
}

impl From<AvailableCopies> for i32 {
    fn from(value: AvailableCopies) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TotalCopies(i32);

impl TotalCopies {
    pub fn new(copies: impl Into<i32>) -> Self {
        Self(copies.into())
    }
}

impl AsRef<i32> for TotalCopies {
    fn as_ref(&self) -> &i32 {
        &self.0
    }
}

impl From<TotalCopies> for i32 {
    fn from(value: TotalCopies) -> Self {
        value.0
    }
}
