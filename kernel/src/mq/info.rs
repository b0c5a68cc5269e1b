use destructure::Destructure;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope around a queued payload. The id identifies the job across
/// retries and in the delayed/failed inspection surfaces.
#[derive(Debug, Clone, Serialize, Deserialize, Destructure)]
pub struct QueueInfo<T> {
    id: Uuid,
    data: T,
}

impl<T> QueueInfo<T> {
    pub fn new(id: Uuid, data: T) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn data(&self) -> &T {
        &self.data
    }
}

impl<T> From<T> for QueueInfo<T> {
    fn from(value: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            data: value,
        }
    }
}

/// A job parked in the delayed or failed set, with the rendered report
/// of what went wrong.
#[derive(Debug, Clone, Serialize, Deserialize, Destructure)]
pub struct ErroredInfo<T> {
    id: Uuid,
    data: T,
    stack_trace: String,
}

impl<T> ErroredInfo<T> {
    pub fn new(id: Uuid, data: T, stack_trace: String) -> Self {
        Self {
            id,
            data,
            stack_trace,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub queued: usize,
    pub delayed: usize,
    pub failed: usize,
}
