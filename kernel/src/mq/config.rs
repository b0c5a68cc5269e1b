use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MQConfig {
    pub worker_count: i32,
    pub max_retry: i32,
    pub retry_delay: Duration,
}

impl Default for MQConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            max_retry: 3,
            retry_delay: Duration::from_secs(180),
        }
    }
}
