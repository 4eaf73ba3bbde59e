use crate::adapters::queue::ScoreQueue;
use crate::common::context::Context;
use crate::common::redis_pool::RedisPool;
use crate::storage::Storage;
use sqlx::{MySql, Pool};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<MySql>,
    pub redis: RedisPool,
    pub storage: Arc<dyn Storage>,
    pub queue: Arc<dyn ScoreQueue>,
}

impl Context for AppState {
    fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    fn queue(&self) -> &dyn ScoreQueue {
        self.queue.as_ref()
    }
}
