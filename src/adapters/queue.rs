use crate::common::error::{AppError, ServiceResult};
use crate::common::redis_pool::RedisPool;
use crate::models::queue::ScoreItem;
use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::error;

#[async_trait]
pub trait ScoreQueue: Send + Sync {
    async fn enqueue(&self, item: &ScoreItem) -> anyhow::Result<()>;

    /// Waits up to `timeout` for the next item.
    async fn dequeue(&self, timeout: Duration) -> ServiceResult<Option<ScoreItem>>;

    /// Parks an item that will not be retried.
    async fn quarantine(&self, item: &ScoreItem) -> anyhow::Result<()>;
}

/// Redis list consumed from the right, produced from the left.
pub struct RedisScoreQueue {
    redis: RedisPool,
    queue_name: String,
    failed_queue_name: String,
}

impl RedisScoreQueue {
    pub fn new(redis: RedisPool, queue_name: &str) -> Self {
        Self {
            redis,
            queue_name: queue_name.to_owned(),
            failed_queue_name: format!("{queue_name}:failed"),
        }
    }

    async fn push(&self, queue_name: &str, payload: String) -> anyhow::Result<()> {
        let mut conn = self.redis.get().await?;
        let _: () = conn.lpush(queue_name, payload).await?;
        Ok(())
    }
}

#[async_trait]
impl ScoreQueue for RedisScoreQueue {
    async fn enqueue(&self, item: &ScoreItem) -> anyhow::Result<()> {
        let payload = serde_json::to_string(item)?;
        self.push(&self.queue_name, payload).await
    }

    async fn dequeue(&self, timeout: Duration) -> ServiceResult<Option<ScoreItem>> {
        let mut conn = self.redis.get().await?;
        let popped: Option<(String, String)> = conn
            .brpop(&self.queue_name, timeout.as_secs_f64())
            .await?;
        let Some((_, payload)) = popped else {
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(item) => Ok(Some(item)),
            Err(e) => {
                error!(queue = %self.queue_name, %payload, "Failed to decode queue item: {e}");
                self.push(&self.failed_queue_name, payload).await?;
                Err(AppError::QueueDecodingFailed)
            }
        }
    }

    async fn quarantine(&self, item: &ScoreItem) -> anyhow::Result<()> {
        let payload = serde_json::to_string(item)?;
        self.push(&self.failed_queue_name, payload).await
    }
}

#[derive(Default)]
struct MemoryQueueState {
    pending: VecDeque<ScoreItem>,
    failed: Vec<ScoreItem>,
}

/// In-process queue with the same ordering as the redis one.
#[derive(Default)]
pub struct MemoryScoreQueue {
    state: Mutex<MemoryQueueState>,
    notify: Notify,
}

impl MemoryScoreQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryQueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.state().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending(&self) -> Vec<ScoreItem> {
        self.state().pending.iter().cloned().collect()
    }

    pub fn failed(&self) -> Vec<ScoreItem> {
        self.state().failed.clone()
    }
}

#[async_trait]
impl ScoreQueue for MemoryScoreQueue {
    async fn enqueue(&self, item: &ScoreItem) -> anyhow::Result<()> {
        self.state().pending.push_back(item.clone());
        self.notify.notify_one();
        Ok(())
    }

    async fn dequeue(&self, timeout: Duration) -> ServiceResult<Option<ScoreItem>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            let popped = self.state().pending.pop_front();
            if let Some(item) = popped {
                return Ok(Some(item));
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn quarantine(&self, item: &ScoreItem) -> anyhow::Result<()> {
        self.state().failed.push(item.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_queue_is_fifo() {
        let queue = MemoryScoreQueue::new();
        queue.enqueue(&ScoreItem::new(1)).await.unwrap();
        queue.enqueue(&ScoreItem::forced(2)).await.unwrap();

        let first = queue.dequeue(Duration::from_millis(10)).await.unwrap();
        let second = queue.dequeue(Duration::from_millis(10)).await.unwrap();
        assert_eq!(first, Some(ScoreItem::new(1)));
        assert_eq!(second, Some(ScoreItem::forced(2)));
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn memory_queue_times_out_when_empty() {
        let queue = MemoryScoreQueue::new();
        let item = queue.dequeue(Duration::from_secs(5)).await.unwrap();
        assert_eq!(item, None);
    }

    #[test]
    fn decodes_items_without_optional_fields() {
        let item: ScoreItem = serde_json::from_str(r#"{"score_id": 42}"#).unwrap();
        assert_eq!(item, ScoreItem::new(42));
    }
}
