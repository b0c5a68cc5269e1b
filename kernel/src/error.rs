use std::fmt::Display;

use error_stack::Context;

#[derive(Debug)]
pub enum KernelError {
    NotFound,
    ResourceExhausted,
    InvalidState,
    Conflict,
    Validation,
    Unauthorized,
    Forbidden,
    Concurrency,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::NotFound => write!(f, "Entity does not exist or is inactive"),
            KernelError::ResourceExhausted => write!(f, "No copies left to allocate"),
            KernelError::InvalidState => write!(f, "Operation not allowed in current state"),
            KernelError::Conflict => write!(f, "Conflicts with an existing record"),
            KernelError::Validation => write!(f, "Input failed validation"),
            KernelError::Unauthorized => write!(f, "Caller identity is missing or malformed"),
            KernelError::Forbidden => write!(f, "Caller lacks permission"),
            KernelError::Concurrency => write!(f, "Concurrency error"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
