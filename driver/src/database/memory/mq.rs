use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{error, warn};
use uuid::Uuid;

use kernel::interface::mq::{
    AsyncWork, DestructErroredInfo, ErrorOperation, ErroredInfo, MQConfig, MessageQueue,
    QueueInfo, QueueStats,
};
use kernel::KernelError;

struct MemoryQueueState<T> {
    delayed: HashMap<Uuid, ErroredInfo<T>>,
    failed: HashMap<Uuid, ErroredInfo<T>>,
    retrying: usize,
}

impl<T> Default for MemoryQueueState<T> {
    fn default() -> Self {
        Self {
            delayed: HashMap::new(),
            failed: HashMap::new(),
            retrying: 0,
        }
    }
}

/// In-process queue with the stream backend's observable behavior:
/// failures park in a dead-letter map and delays are retried after the
/// configured delay up to the retry budget. The first delivery runs
/// inside `queue` itself, so a caller returning from `queue` has either
/// seen the job succeed or knows it entered the retry cycle.
pub struct MemoryMessageQueue<T>
where
    T: 'static + Clone + Serialize + for<'de> Deserialize<'de> + Sync + Send,
{
    config: MQConfig,
    state: Arc<Mutex<MemoryQueueState<T>>>,
    process: Arc<Box<dyn Fn(T) -> AsyncWork + Send + Sync>>,
}

impl<T> MemoryMessageQueue<T>
where
    T: 'static + Clone + Serialize + for<'de> Deserialize<'de> + Sync + Send,
{
    pub fn new<F>(config: MQConfig, process: F) -> Self
    where
        F: 'static + Fn(T) -> AsyncWork + Sync + Send,
    {
        Self {
            config,
            state: Arc::new(Mutex::new(MemoryQueueState::default())),
            process: Arc::new(Box::new(process)),
        }
    }

    async fn run(&self, id: Uuid, data: T) {
        let result = (self.process)(data.clone()).await;
        let Err(report) = result else {
            return;
        };
        match report.current_context() {
            ErrorOperation::Failed => {
                let mut state = self.state.lock().await;
                state
                    .failed
                    .insert(id, ErroredInfo::new(id, data, format!("{report:?}")));
                error!("Failed Id: {id}, TryCount: 1");
            }
            ErrorOperation::Delay => {
                {
                    let mut state = self.state.lock().await;
                    state
                        .delayed
                        .insert(id, ErroredInfo::new(id, data.clone(), format!("{report:?}")));
                    state.retrying += 1;
                }
                warn!("Delayed Id: {id}, TryCount: 1");
                self.spawn_retries(id, data);
            }
        }
    }

    fn spawn_retries(&self, id: Uuid, data: T) {
        let state = Arc::clone(&self.state);
        let process = Arc::clone(&self.process);
        let config = self.config.clone();
        tokio::spawn(async move {
            let mut delivered = 1;
            loop {
                sleep(config.retry_delay).await;
                delivered += 1;
                let result = process(data.clone()).await;
                let mut guard = state.lock().await;
                match result {
                    Ok(()) => {
                        guard.delayed.remove(&id);
                        guard.retrying -= 1;
                        return;
                    }
                    Err(report) => {
                        let exhausted = delivered > config.max_retry;
                        if exhausted
                            || matches!(report.current_context(), ErrorOperation::Failed)
                        {
                            guard.delayed.remove(&id);
                            guard.retrying -= 1;
                            let report = if exhausted {
                                report.attach_printable("Retry budget exhausted")
                            } else {
                                report
                            };
                            guard
                                .failed
                                .insert(id, ErroredInfo::new(id, data, format!("{report:?}")));
                            error!("Failed Id: {id}, TryCount: {delivered}");
                            return;
                        }
                        guard
                            .delayed
                            .insert(id, ErroredInfo::new(id, data.clone(), format!("{report:?}")));
                        warn!("Delayed Id: {id}, TryCount: {delivered}");
                    }
                }
            }
        });
    }

    fn page(
        source: &HashMap<Uuid, ErroredInfo<T>>,
        size: &i64,
        offset: &i64,
    ) -> Vec<ErroredInfo<T>> {
        let mut infos: Vec<ErroredInfo<T>> = source.values().cloned().collect();
        infos.sort_by(|a, b| a.id().cmp(b.id()));
        let offset = usize::try_from(*offset).unwrap_or(0);
        let size = usize::try_from(*size).unwrap_or(0);
        infos.into_iter().skip(offset).take(size).collect()
    }
}

#[async_trait::async_trait]
impl<T> MessageQueue<T> for MemoryMessageQueue<T>
where
    T: 'static + Clone + Serialize + for<'de> Deserialize<'de> + Sync + Send,
{
    // Deliveries run on demand; there is no standing worker pool.
    fn start_workers(&self) {}

    async fn queue(&self, info: &QueueInfo<T>) -> error_stack::Result<(), KernelError> {
        self.run(*info.id(), info.data().clone()).await;
        Ok(())
    }

    async fn stats(&self) -> error_stack::Result<QueueStats, KernelError> {
        let state = self.state.lock().await;
        Ok(QueueStats {
            queued: state.retrying,
            delayed: state.delayed.len(),
            failed: state.failed.len(),
        })
    }

    async fn get_delayed_infos(
        &self,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<ErroredInfo<T>>, KernelError> {
        let state = self.state.lock().await;
        Ok(Self::page(&state.delayed, size, offset))
    }

    async fn get_delayed_info(
        &self,
        id: &Uuid,
    ) -> error_stack::Result<Option<ErroredInfo<T>>, KernelError> {
        Ok(self.state.lock().await.delayed.get(id).cloned())
    }

    async fn get_failed_infos(
        &self,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<ErroredInfo<T>>, KernelError> {
        let state = self.state.lock().await;
        Ok(Self::page(&state.failed, size, offset))
    }

    async fn get_failed_info(
        &self,
        id: &Uuid,
    ) -> error_stack::Result<Option<ErroredInfo<T>>, KernelError> {
        Ok(self.state.lock().await.failed.get(id).cloned())
    }

    async fn retry(&self, id: &Uuid) -> error_stack::Result<bool, KernelError> {
        let info = self.state.lock().await.failed.remove(id);
        let Some(info) = info else {
            return Ok(false);
        };
        let DestructErroredInfo { id, data, .. } = info.into_destruct();
        self.run(id, data).await;
        Ok(true)
    }

    async fn remove(&self, id: &Uuid) -> error_stack::Result<bool, KernelError> {
        Ok(self.state.lock().await.failed.remove(id).is_some())
    }

    async fn clean(&self) -> error_stack::Result<u64, KernelError> {
        let mut state = self.state.lock().await;
        let count = u64::try_from(state.failed.len()).unwrap_or(u64::MAX);
        state.failed.clear();
        Ok(count)
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use error_stack::Report;
    use serde::{Deserialize, Serialize};
    use tokio::time::sleep;
    use uuid::Uuid;

    use kernel::interface::mq::{ErrorOperation, MQConfig, MessageQueue, QueueInfo};
    use kernel::KernelError;

    use super::MemoryMessageQueue;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct TestData {
        poisoned: bool,
    }

    fn config(retry_delay: Duration) -> MQConfig {
        MQConfig {
            worker_count: 1,
            max_retry: 1,
            retry_delay,
        }
    }

    #[tokio::test]
    async fn delivered_jobs_leave_no_residue() -> error_stack::Result<(), KernelError> {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mq = MemoryMessageQueue::new(config(Duration::from_millis(10)), move |_: TestData| {
            let seen = Arc::clone(&seen);
            Box::pin(async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        });

        mq.queue(&QueueInfo::new(Uuid::new_v4(), TestData { poisoned: false }))
            .await?;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = mq.stats().await?;
        assert_eq!((stats.queued, stats.delayed, stats.failed), (0, 0, 0));
        Ok(())
    }

    #[tokio::test]
    async fn poison_jobs_park_in_the_dead_letter_set() -> error_stack::Result<(), KernelError> {
        let mq = MemoryMessageQueue::new(config(Duration::from_millis(10)), |data: TestData| {
            Box::pin(async move {
                if data.poisoned {
                    Err(Report::new(ErrorOperation::Failed))
                } else {
                    Ok(())
                }
            })
        });

        let id = Uuid::new_v4();
        mq.queue(&QueueInfo::new(id, TestData { poisoned: true }))
            .await?;

        assert_eq!(mq.stats().await?.failed, 1);
        assert!(mq.get_failed_info(&id).await?.is_some());

        // Still poisoned: the retry fails straight back into the set.
        assert!(mq.retry(&id).await?);
        assert_eq!(mq.stats().await?.failed, 1);

        assert!(mq.remove(&id).await?);
        assert!(!mq.remove(&id).await?);
        assert_eq!(mq.stats().await?.failed, 0);
        Ok(())
    }

    #[tokio::test]
    async fn delayed_jobs_exhaust_into_the_dead_letter_set(
    ) -> error_stack::Result<(), KernelError> {
        let mq = MemoryMessageQueue::new(config(Duration::from_millis(5)), |_: TestData| {
            Box::pin(async move { Err(Report::new(ErrorOperation::Delay)) })
        });

        let id = Uuid::new_v4();
        mq.queue(&QueueInfo::new(id, TestData { poisoned: false }))
            .await?;
        assert_eq!(mq.stats().await?.delayed, 1);

        // One retry is allowed; once it delays again the budget is spent.
        sleep(Duration::from_millis(500)).await;
        let stats = mq.stats().await?;
        assert_eq!(stats.delayed, 0);
        assert_eq!(stats.failed, 1);

        let cleaned = mq.clean().await?;
        assert_eq!(cleaned, 1);
        Ok(())
    }
}
