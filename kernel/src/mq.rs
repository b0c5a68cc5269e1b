mod config;
mod info;

pub use crate::mq::{config::*, info::*};
use crate::KernelError;
use error_stack::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

/// How a worker run of a job ended short of success. `Delay` leaves the
/// job pending for another delivery after the retry delay; `Failed`
/// parks it in the dead-letter set immediately.
#[derive(Debug)]
pub enum ErrorOperation {
    Delay,
    Failed,
}

impl Display for ErrorOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorOperation::Delay => write!(f, "Queue delayed"),
            ErrorOperation::Failed => write!(f, "Queue failed"),
        }
    }
}

impl Context for ErrorOperation {}

pub type AsyncWork = Pin<Box<dyn Future<Output = error_stack::Result<(), ErrorOperation>> + Send>>;

/// At-least-once job dispatch. `queue` is the producer surface; the
/// administrative operations inspect and manage jobs that did not go
/// through cleanly. Delayed jobs retry on their own, so `retry`,
/// `remove` and `clean` act on the dead-letter (failed) set only.
#[async_trait::async_trait]
pub trait MessageQueue<T>: 'static + Sync + Send
where
    T: 'static + Clone + Serialize + for<'de> Deserialize<'de> + Sync + Send,
{
    fn start_workers(&self);

    async fn queue(&self, info: &QueueInfo<T>) -> error_stack::Result<(), KernelError>;

    async fn stats(&self) -> error_stack::Result<QueueStats, KernelError>;

    async fn get_delayed_infos(
        &self,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<ErroredInfo<T>>, KernelError>;

    async fn get_delayed_info(
        &self,
        id: &Uuid,
    ) -> error_stack::Result<Option<ErroredInfo<T>>, KernelError>;

    async fn get_failed_infos(
        &self,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<ErroredInfo<T>>, KernelError>;

    async fn get_failed_info(
        &self,
        id: &Uuid,
    ) -> error_stack::Result<Option<ErroredInfo<T>>, KernelError>;

    /// Requeues a failed job under its original id. `false` when no
    /// failed job has that id.
    async fn retry(&self, id: &Uuid) -> error_stack::Result<bool, KernelError>;

    /// Drops a failed job for good. `false` when no failed job has
    /// that id.
    async fn remove(&self, id: &Uuid) -> error_stack::Result<bool, KernelError>;

    /// Drops every failed job, returning how many were removed.
    async fn clean(&self) -> error_stack::Result<u64, KernelError>;
}
