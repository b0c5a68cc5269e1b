use std::fmt::Debug;
use std::str::from_utf8;
use std::sync::Arc;
use std::time::Duration;

use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{redis, Connection};
use error_stack::{Report, ResultExt};
use redis::streams::StreamReadOptions;
use redis::{RedisResult, Value};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, warn};
use uuid::Uuid;

use kernel::interface::database::DatabaseConnection;
use kernel::interface::mq::{
    AsyncWork, DestructErroredInfo, DestructQueueInfo, ErrorOperation, ErroredInfo, MQConfig,
    MessageQueue, QueueInfo, QueueStats,
};
use kernel::KernelError;

use crate::database::RedisDatabase;
use crate::error::ConvertError;

#[derive(Debug)]
struct QueueData<T> {
    id: String,
    delivered_count: i64,
    info: QueueInfo<T>,
}

/// Stream-backed job queue. Jobs wait in a Redis stream and are handed
/// to workers through a consumer group; a job stays pending until it is
/// acknowledged, so a delayed or crashed run is reclaimed after the
/// retry delay. Failed jobs move to a hash keyed by job id.
pub struct RedisMessageQueue<T>
where
    T: 'static + Clone + Serialize + for<'de> Deserialize<'de> + Sync + Send,
{
    name: String,
    db: RedisDatabase,
    config: MQConfig,
    worker_process: Arc<Box<dyn Fn(T) -> AsyncWork + Send + Sync>>,
}

impl<T> RedisMessageQueue<T>
where
    T: 'static + Clone + Serialize + for<'de> Deserialize<'de> + Sync + Send,
{
    pub fn new<F>(db: RedisDatabase, name: &str, config: MQConfig, process: F) -> Self
    where
        F: 'static + Fn(T) -> AsyncWork + Sync + Send,
    {
        Self {
            name: name.to_string(),
            db,
            config,
            worker_process: Arc::new(Box::new(process)),
        }
    }

    #[tracing::instrument(skip(db, block))]
    async fn listen(
        db: RedisDatabase,
        name: String,
        config: MQConfig,
        block: Arc<Box<impl Fn(T) -> AsyncWork + Sync + Send + ?Sized>>,
    ) {
        let member_name = format!("consumer:{}", Uuid::new_v4());
        let idle = i64::try_from(config.retry_delay.as_millis()).unwrap_or(i64::MAX);
        loop {
            let QueueData {
                id,
                delivered_count,
                info,
            } = {
                let mut con = match db.transact().await {
                    Ok(con) => con,
                    Err(report) => {
                        error!("{report:?}");
                        sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                };
                let mut result =
                    RedisQueueInternal::pop_pending::<T>(&mut con, &name, &member_name, &idle)
                        .await;
                if result.is_err() || result.as_ref().is_ok_and(Option::is_none) {
                    result = RedisQueueInternal::pop_to_process(&mut con, &name, &member_name).await;
                }
                match result {
                    Ok(Some(data)) => data,
                    Ok(None) => continue,
                    Err(report) => {
                        error!("{report:?}");
                        sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                }
            };
            debug!("Processing Id: {id}, TryCount: {delivered_count}");
            let DestructQueueInfo { id: uuid, data }: DestructQueueInfo<T> = info.into_destruct();
            let result = block(data.clone()).await;
            {
                let mut con = match db.transact().await {
                    Ok(con) => con,
                    Err(report) => {
                        error!("{report:?}");
                        continue;
                    }
                };

                if let Err(report) = result {
                    let exhausted = delivered_count > config.max_retry.into();
                    if !exhausted && matches!(report.current_context(), ErrorOperation::Delay) {
                        if let Err(report) = RedisQueueInternal::push_delayed_info(
                            &mut con,
                            &name,
                            uuid,
                            data,
                            format!("{report:?}"),
                        )
                        .await
                        {
                            error!("{report:?}");
                        }
                        warn!("Delayed Id: {id}, TryCount: {delivered_count}");
                        // Not acknowledged; reclaimed after the retry delay.
                        continue;
                    }
                    let report = if exhausted {
                        report.attach_printable("Retry budget exhausted")
                    } else {
                        report
                    };
                    if let Err(report) = RedisQueueInternal::push_failed_info(
                        &mut con,
                        &name,
                        format!("{report:?}"),
                        uuid,
                        data,
                    )
                    .await
                    {
                        error!("{report:?}");
                    }
                    error!("Failed Id: {id}, TryCount: {delivered_count}");
                } else {
                    debug!("Done Id: {id}, TryCount: {delivered_count}");
                }
                if let Err(report) = RedisQueueInternal::mark_done(&mut con, &name, &id).await {
                    error!("{report:?}");
                } else if delivered_count > 0 {
                    if let Err(report) =
                        RedisQueueInternal::remove_delayed_info(&mut con, &name, &uuid).await
                    {
                        error!("{report:?}");
                    };
                };
            }
        }
    }
}

#[async_trait::async_trait]
impl<T> MessageQueue<T> for RedisMessageQueue<T>
where
    T: 'static + Clone + Serialize + for<'de> Deserialize<'de> + Sync + Send,
{
    fn start_workers(&self) {
        for _ in 0..self.config.worker_count {
            let db = self.db.clone();
            let process = Arc::clone(&self.worker_process);
            let name = self.name.clone();
            let config = self.config.clone();
            tokio::spawn(async move {
                RedisMessageQueue::listen(db, name, config, process).await;
            });
        }
    }

    async fn queue(&self, info: &QueueInfo<T>) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.transact().await?;
        RedisQueueInternal::insert_waiting(&mut con, &self.name, info).await
    }

    async fn stats(&self) -> error_stack::Result<QueueStats, KernelError> {
        let name = &self.name;
        let mut con = self.db.transact().await?;
        let queued = RedisQueueInternal::get_wait_len(&mut con, name).await?;
        let delayed = RedisQueueInternal::get_delayed_len(&mut con, name).await?;
        let failed = RedisQueueInternal::get_failed_len(&mut con, name).await?;
        Ok(QueueStats {
            queued: usize::try_from(queued).change_context_lazy(|| KernelError::Internal)?,
            delayed: usize::try_from(delayed).change_context_lazy(|| KernelError::Internal)?,
            failed: usize::try_from(failed).change_context_lazy(|| KernelError::Internal)?,
        })
    }

    async fn get_delayed_infos(
        &self,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<ErroredInfo<T>>, KernelError> {
        let mut con = self.db.transact().await?;
        RedisQueueInternal::get_delayed_infos(&mut con, &self.name, size, offset).await
    }

    async fn get_delayed_info(
        &self,
        id: &Uuid,
    ) -> error_stack::Result<Option<ErroredInfo<T>>, KernelError> {
        let mut con = self.db.transact().await?;
        RedisQueueInternal::get_info_one(&mut con, &delayed(&self.name), id).await
    }

    async fn get_failed_infos(
        &self,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<ErroredInfo<T>>, KernelError> {
        let mut con = self.db.transact().await?;
        RedisQueueInternal::get_failed_infos(&mut con, &self.name, size, offset).await
    }

    async fn get_failed_info(
        &self,
        id: &Uuid,
    ) -> error_stack::Result<Option<ErroredInfo<T>>, KernelError> {
        let mut con = self.db.transact().await?;
        RedisQueueInternal::get_info_one(&mut con, &failed(&self.name), id).await
    }

    async fn retry(&self, id: &Uuid) -> error_stack::Result<bool, KernelError> {
        let mut con = self.db.transact().await?;
        RedisQueueInternal::retry_failed::<T>(&mut con, &self.name, id).await
    }

    async fn remove(&self, id: &Uuid) -> error_stack::Result<bool, KernelError> {
        let mut con = self.db.transact().await?;
        RedisQueueInternal::remove_failed_info(&mut con, &self.name, id).await
    }

    async fn clean(&self) -> error_stack::Result<u64, KernelError> {
        let mut con = self.db.transact().await?;
        RedisQueueInternal::clean_failed(&mut con, &self.name).await
    }
}

const QUEUE_FIELD: &str = "info";

fn group(name: &str) -> String {
    format!("g:{name}")
}

fn failed(name: &str) -> String {
    format!("failed:{name}")
}

fn delayed(name: &str) -> String {
    format!("delayed:{name}")
}

fn parse_error(value: impl Debug) -> Report<KernelError> {
    Report::new(KernelError::Internal)
        .attach_printable(format!("Failed to parse received data. {value:?}"))
}

pub(in crate::database) struct RedisQueueInternal;

impl RedisQueueInternal {
    async fn create_group(con: &mut Connection, name: &str) -> RedisResult<Value> {
        con.xgroup_create_mkstream(name, &group(name), 0).await
    }

    async fn insert_waiting<T: Serialize>(
        con: &mut Connection,
        name: &str,
        info: &QueueInfo<T>,
    ) -> error_stack::Result<(), KernelError> {
        // The group may already exist; that is fine.
        let _ = Self::create_group(con, name).await;
        let serialized = serde_json::to_string(info).convert_error()?;
        con.xadd(name, "*", &[(QUEUE_FIELD, &serialized)])
            .await
            .convert_error()
    }

    async fn pop_to_process<T>(
        con: &mut Connection,
        name: &str,
        member: &str,
    ) -> error_stack::Result<Option<QueueData<T>>, KernelError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let options = StreamReadOptions::default()
            .block(1000)
            .count(1)
            .group(group(name), member);
        let result: Value = con
            .xread_options(&[name], &[">"], &options)
            .await
            .convert_error()?;
        let bulk = match result {
            Value::Bulk(bulk) => bulk,
            Value::Nil => return Ok(None),
            _ => return Err(parse_error(result)),
        };
        let bulk = match bulk.as_slice() {
            [Value::Bulk(bulk)] => bulk,
            _ => return Err(parse_error(bulk)),
        };
        let bulk = match bulk.as_slice() {
            [Value::Data(_name), Value::Bulk(bulk)] => bulk,
            _ => return Err(parse_error(bulk)),
        };
        let bulk = match bulk.as_slice() {
            [Value::Bulk(bulk)] => bulk,
            _ => return Err(parse_error(bulk)),
        };
        let (id, bulk) = match bulk.as_slice() {
            [Value::Data(id), Value::Bulk(bulk)] => (id, bulk),
            _ => return Err(parse_error(bulk)),
        };
        let data = match bulk.as_slice() {
            [Value::Data(_field), Value::Data(data)] => data,
            _ => return Err(parse_error(bulk)),
        };
        Ok(Some(QueueData {
            id: from_utf8(id)
                .change_context_lazy(|| KernelError::Internal)?
                .to_string(),
            delivered_count: 0,
            info: serde_json::from_slice(data).change_context_lazy(|| KernelError::Internal)?,
        }))
    }

    async fn mark_done(
        con: &mut Connection,
        name: &str,
        id: &str,
    ) -> error_stack::Result<(), KernelError> {
        con.xack::<_, _, _, ()>(name, &group(name), &[id])
            .await
            .convert_error()?;
        con.xdel(name, &[id]).await.convert_error()
    }

    async fn pop_pending<T>(
        con: &mut Connection,
        name: &str,
        own_member: &str,
        idle_millis: &i64,
    ) -> error_stack::Result<Option<QueueData<T>>, KernelError>
    where
        T: for<'de> Deserialize<'de>,
    {
        // The group may already exist; that is fine.
        let _ = Self::create_group(con, name).await;
        let group = group(name);
        let value: Value = redis::cmd("XPENDING")
            .arg(name)
            .arg(&group)
            .arg("IDLE")
            .arg(idle_millis)
            .arg("-")
            .arg("+")
            .arg(1) // count
            .query_async(con)
            .await
            .convert_error()?;

        let bulk = match value {
            Value::Bulk(bulk) => bulk,
            _ => return Err(parse_error(value)),
        };
        if bulk.is_empty() {
            return Ok(None);
        }
        let bulk = match bulk.as_slice() {
            [Value::Bulk(bulk)] => bulk,
            _ => return Err(parse_error(bulk)),
        };
        let (id, count) = match bulk.as_slice() {
            [Value::Data(id), Value::Data(_original_owner), _time, Value::Int(count)] => (
                from_utf8(id)
                    .change_context_lazy(|| KernelError::Internal)?
                    .to_string(),
                *count,
            ),
            _ => return Err(parse_error(bulk)),
        };

        let result: Value = con
            .xclaim(name, &group, own_member, idle_millis, &[&id])
            .await
            .convert_error()?;

        let bulk = match result {
            Value::Bulk(bulk) => bulk,
            _ => return Err(parse_error(result)),
        };
        let bulk = match bulk.as_slice() {
            [Value::Bulk(bulk)] => bulk,
            _ => return Err(parse_error(bulk)),
        };
        let bulk = match bulk.as_slice() {
            [Value::Data(_id), Value::Bulk(bulk)] => bulk,
            _ => return Err(parse_error(bulk)),
        };
        match bulk.as_slice() {
            [Value::Data(_field), Value::Data(data)] => {
                let info: QueueInfo<T> =
                    serde_json::from_slice(data).change_context_lazy(|| KernelError::Internal)?;

                Ok(Some(QueueData {
                    id,
                    delivered_count: count,
                    info,
                }))
            }
            _ => Err(parse_error(bulk)),
        }
    }

    async fn push_delayed_info<T: Serialize>(
        con: &mut Connection,
        name: &str,
        id: Uuid,
        data: T,
        stack_trace: String,
    ) -> error_stack::Result<(), KernelError> {
        let string_id = id.to_string();
        let info = ErroredInfo::new(id, data, stack_trace);
        let raw = serde_json::to_string(&info).convert_error()?;
        con.hset(&delayed(name), &string_id, &raw)
            .await
            .convert_error()
    }

    async fn remove_delayed_info(
        con: &mut Connection,
        name: &str,
        id: &Uuid,
    ) -> error_stack::Result<(), KernelError> {
        con.hdel(&delayed(name), &id.to_string())
            .await
            .convert_error()
    }

    async fn get_delayed_infos<T: for<'de> Deserialize<'de>>(
        con: &mut Connection,
        name: &str,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<ErroredInfo<T>>, KernelError> {
        Self::get_info_from_hash(con, &delayed(name), size, offset).await
    }

    async fn get_delayed_len(
        con: &mut Connection,
        name: &str,
    ) -> error_stack::Result<i64, KernelError> {
        let delayed = delayed(name);
        let result: Value = con.hlen(&delayed).await.convert_error()?;
        if let Value::Int(size) = result {
            Ok(size)
        } else {
            Err(Report::new(KernelError::Internal)
                .attach_printable(format!("Failed to get size. target: {delayed}")))
        }
    }

    async fn push_failed_info<T: Serialize>(
        con: &mut Connection,
        name: &str,
        info: String,
        uuid: Uuid,
        data: T,
    ) -> error_stack::Result<(), KernelError> {
        let raw_uuid = uuid.to_string();
        let data = ErroredInfo::new(uuid, data, info);
        let raw = serde_json::to_string(&data).convert_error()?;
        con.hset(&failed(name), &raw_uuid, &raw)
            .await
            .convert_error()
    }

    async fn get_failed_infos<T: for<'de> Deserialize<'de>>(
        con: &mut Connection,
        name: &str,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<ErroredInfo<T>>, KernelError> {
        Self::get_info_from_hash(con, &failed(name), size, offset).await
    }

    async fn get_failed_len(
        con: &mut Connection,
        name: &str,
    ) -> error_stack::Result<i64, KernelError> {
        let failed = failed(name);
        let result: Value = con.hlen(&failed).await.convert_error()?;
        if let Value::Int(size) = result {
            Ok(size)
        } else {
            Err(Report::new(KernelError::Internal)
                .attach_printable(format!("Failed to get size. target: {failed}")))
        }
    }

    async fn get_wait_len(
        con: &mut Connection,
        name: &str,
    ) -> error_stack::Result<i64, KernelError> {
        let result: Value = con.xlen(name).await.convert_error()?;
        if let Value::Int(size) = result {
            Ok(size)
        } else {
            Err(Report::new(KernelError::Internal)
                .attach_printable(format!("Failed to get size. target: {name}")))
        }
    }

    async fn get_info_one<T: for<'de> Deserialize<'de>>(
        con: &mut Connection,
        hash: &str,
        id: &Uuid,
    ) -> error_stack::Result<Option<ErroredInfo<T>>, KernelError> {
        let raw: Option<String> = con.hget(hash, &id.to_string()).await.convert_error()?;
        raw.map(|raw| serde_json::from_str(&raw).convert_error())
            .transpose()
    }

    async fn retry_failed<T>(
        con: &mut Connection,
        name: &str,
        id: &Uuid,
    ) -> error_stack::Result<bool, KernelError>
    where
        T: Serialize + for<'de> Deserialize<'de>,
    {
        let found: Option<ErroredInfo<T>> = Self::get_info_one(con, &failed(name), id).await?;
        let Some(info) = found else {
            return Ok(false);
        };
        let DestructErroredInfo { id, data, .. } = info.into_destruct();
        // Re-queue first; a duplicate run beats a lost job.
        Self::insert_waiting(con, name, &QueueInfo::new(id, data)).await?;
        con.hdel::<_, _, ()>(&failed(name), &id.to_string())
            .await
            .convert_error()?;
        Ok(true)
    }

    async fn remove_failed_info(
        con: &mut Connection,
        name: &str,
        id: &Uuid,
    ) -> error_stack::Result<bool, KernelError> {
        let removed: i64 = con
            .hdel(&failed(name), &id.to_string())
            .await
            .convert_error()?;
        Ok(removed > 0)
    }

    async fn clean_failed(con: &mut Connection, name: &str) -> error_stack::Result<u64, KernelError> {
        let len = Self::get_failed_len(con, name).await?;
        let _: i64 = con.del(&failed(name)).await.convert_error()?;
        u64::try_from(len).change_context_lazy(|| KernelError::Internal)
    }

    async fn get_info_from_hash<T: for<'de> Deserialize<'de>>(
        con: &mut Connection,
        name: &str,
        size: &i64,
        offset: &i64,
    ) -> error_stack::Result<Vec<T>, KernelError> {
        if *size <= 0 {
            return Ok(vec![]);
        }
        let result: Value = redis::cmd("HSCAN")
            .arg(name)
            .arg(offset)
            .arg("COUNT")
            .arg(size)
            .query_async(con)
            .await
            .convert_error()?;
        let bulk = match result {
            Value::Bulk(bulk) => bulk,
            _ => return Err(parse_error(result)),
        };
        let bulk = match bulk.as_slice() {
            [Value::Data(_offset), Value::Bulk(bulk)] => bulk,
            _ => return Err(parse_error(bulk)),
        };
        let usize = usize::try_from(*size).change_context_lazy(|| KernelError::Internal)?;
        // HSCAN may return more than size
        bulk.chunks(2)
            .take(usize)
            .map(|pair| match pair {
                [Value::Data(_id), Value::Data(data)] => {
                    let info = serde_json::from_slice(data)
                        .change_context_lazy(|| KernelError::Internal)?;
                    Ok(info)
                }
                _ => Err(parse_error(pair)),
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use error_stack::Report;
    use rand::random;
    use serde::{Deserialize, Serialize};
    use tokio::time::sleep;
    use tracing::info;
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::mq::ErrorOperation::Delay;
    use kernel::interface::mq::{MQConfig, MessageQueue, QueueInfo};
    use kernel::KernelError;

    use crate::database::redis::mq::{QueueData, RedisMessageQueue, RedisQueueInternal};
    use crate::database::RedisDatabase;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct TestData {
        a: String,
    }

    #[test_with::env(REDIS_TEST)]
    #[tokio::test]
    async fn stream_round_trip() -> error_stack::Result<(), KernelError> {
        let db = RedisDatabase::new()?;
        let mut con = db.transact().await?;
        let name = "test_round_trip";
        let member = "member";
        let data = TestData {
            a: "payload".to_string(),
        };
        let info = QueueInfo::new(Uuid::new_v4(), data);
        RedisQueueInternal::insert_waiting(&mut con, name, &info).await?;
        let result: QueueData<TestData> = RedisQueueInternal::pop_to_process(&mut con, name, member)
            .await
            .and_then(|option| option.ok_or_else(|| Report::new(KernelError::Internal)))?;

        sleep(Duration::from_secs(1)).await;
        let pending: Option<QueueData<TestData>> =
            RedisQueueInternal::pop_pending(&mut con, name, member, &500).await?;
        assert!(pending.is_some());

        RedisQueueInternal::mark_done(&mut con, name, &result.id).await?;
        Ok(())
    }

    #[test_with::env(REDIS_TEST)]
    #[tokio::test]
    async fn failed_jobs_can_be_retried_and_cleaned() -> error_stack::Result<(), KernelError> {
        let db = RedisDatabase::new()?;
        let mut con = db.transact().await?;
        let name = &format!("test_failed_{}", Uuid::new_v4());
        let id = Uuid::new_v4();
        let data = TestData {
            a: "broken".to_string(),
        };
        RedisQueueInternal::push_failed_info(&mut con, name, "report".to_string(), id, data)
            .await?;

        let found =
            RedisQueueInternal::get_info_one::<TestData>(&mut con, &super::failed(name), &id)
                .await?;
        assert!(found.is_some());

        // Unknown ids are reported as such, not as errors.
        let retried = RedisQueueInternal::retry_failed::<TestData>(&mut con, name, &Uuid::new_v4())
            .await?;
        assert!(!retried);

        let retried = RedisQueueInternal::retry_failed::<TestData>(&mut con, name, &id).await?;
        assert!(retried);
        let queued = RedisQueueInternal::get_wait_len(&mut con, name).await?;
        assert_eq!(queued, 1);
        let failed = RedisQueueInternal::get_failed_len(&mut con, name).await?;
        assert_eq!(failed, 0);

        RedisQueueInternal::push_failed_info(
            &mut con,
            name,
            "report".to_string(),
            Uuid::new_v4(),
            TestData {
                a: "one".to_string(),
            },
        )
        .await?;
        RedisQueueInternal::push_failed_info(
            &mut con,
            name,
            "report".to_string(),
            Uuid::new_v4(),
            TestData {
                a: "two".to_string(),
            },
        )
        .await?;
        let cleaned = RedisQueueInternal::clean_failed(&mut con, name).await?;
        assert_eq!(cleaned, 2);

        Ok(())
    }

    #[ignore]
    #[test_with::env(REDIS_TEST)]
    #[tokio::test]
    async fn soak() -> error_stack::Result<(), KernelError> {
        let db = RedisDatabase::new()?;
        let name = "test_soak";
        let config = MQConfig {
            worker_count: 5,
            max_retry: 3,
            retry_delay: Duration::from_secs(1),
        };
        let mq = RedisMessageQueue::new(db.clone(), name, config, |data: TestData| {
            Box::pin(async move {
                info!("data: {data:?}");
                sleep(Duration::from_millis(20)).await;
                // Delayed in 50%
                if random() {
                    Ok(())
                } else {
                    Err(Report::new(Delay))
                }
            })
        });

        mq.start_workers();

        for i in 0..1000 {
            let data = TestData {
                a: format!("test:{i}"),
            };
            mq.queue(&QueueInfo::new(Uuid::new_v4(), data)).await?;
        }

        loop {
            let stats = mq.stats().await?;
            info!("{stats:?}");
            if stats.queued == 0 && stats.delayed == 0 {
                return Ok(());
            }
            sleep(Duration::from_secs(1)).await;
        }
    }
}
