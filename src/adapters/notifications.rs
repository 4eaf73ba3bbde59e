use crate::common::redis_pool::RedisPool;
use crate::models::notifications::NotificationEvent;
use redis::AsyncCommands;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{error, warn};

const PUBLISH_ATTEMPTS: u32 = 3;
const PUBLISH_BACKOFF: Duration = Duration::from_millis(250);

/// Fire and forget delivery of events to other services.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: NotificationEvent);
}

/// Publishes events as JSON on a redis channel.
pub struct RedisNotifier {
    redis: RedisPool,
    channel: Arc<str>,
}

impl RedisNotifier {
    pub fn new(redis: RedisPool, channel: &str) -> Self {
        Self {
            redis,
            channel: channel.into(),
        }
    }
}

async fn publish(redis: &RedisPool, channel: &str, payload: &str) -> anyhow::Result<()> {
    let mut conn = redis.get().await?;
    let _: () = conn.publish(channel, payload).await?;
    Ok(())
}

impl Notifier for RedisNotifier {
    fn notify(&self, event: NotificationEvent) {
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(e) => {
                error!(?event, "Failed to serialize notification: {e}");
                return;
            }
        };

        let redis = self.redis.clone();
        let channel = self.channel.clone();
        tokio::spawn(async move {
            for attempt in 1..=PUBLISH_ATTEMPTS {
                match publish(&redis, &channel, &payload).await {
                    Ok(()) => return,
                    Err(e) => {
                        warn!(attempt, channel = &*channel, "Failed to publish notification: {e}");
                        tokio::time::sleep(PUBLISH_BACKOFF * attempt).await;
                    }
                }
            }
            error!(channel = &*channel, %payload, "Dropped notification");
        });
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct MemoryNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, event: NotificationEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
