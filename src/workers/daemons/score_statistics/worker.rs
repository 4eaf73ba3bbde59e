use crate::adapters::discord;
use crate::adapters::queue::ScoreQueue;
use crate::common::error::AppError;
use crate::models::queue::{ProcessOutcome, ScoreItem};
use crate::usecases::score_statistics::ScoreStatisticsProcessor;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Attempts per item, the first delivery included.
    pub max_tries: u32,
    pub dequeue_timeout: Duration,
    pub discord_webhook_url: Option<String>,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            max_tries: 5,
            dequeue_timeout: Duration::from_secs(1),
            discord_webhook_url: None,
        }
    }
}

/// Consumes the queue until `cancellation` fires. An item being processed is finished first.
pub async fn run_worker(
    worker_id: usize,
    processor: Arc<ScoreStatisticsProcessor>,
    queue: Arc<dyn ScoreQueue>,
    cancellation: CancellationToken,
    options: WorkerOptions,
) {
    info!(worker_id, "Worker started");
    while !cancellation.is_cancelled() {
        let item = match queue.dequeue(options.dequeue_timeout).await {
            Ok(Some(item)) => item,
            Ok(None) => continue,
            Err(AppError::QueueDecodingFailed) => continue,
            Err(e) => {
                error!(worker_id, error = e.code(), "Failed to dequeue score");
                tokio::time::sleep(options.dequeue_timeout).await;
                continue;
            }
        };
        handle_item(&processor, queue.as_ref(), &item, &options).await;
    }
    info!(worker_id, "Worker stopped");
}

pub async fn handle_item(
    processor: &ScoreStatisticsProcessor,
    queue: &dyn ScoreQueue,
    item: &ScoreItem,
    options: &WorkerOptions,
) {
    let e = match processor.process(item).await {
        Ok(ProcessOutcome::AlreadyProcessed) => {
            debug!(score_id = item.score_id, "Skipped processed score");
            return;
        }
        Ok(_) => return,
        Err(e) => e,
    };

    if e.is_retryable() && item.tries + 1 < options.max_tries {
        warn!(
            score_id = item.score_id,
            tries = item.tries + 1,
            error = e.code(),
            "Score processing failed, retrying"
        );
        if let Err(enqueue_error) = queue.enqueue(&item.retried()).await {
            error!(score_id = item.score_id, "Failed to requeue score: {enqueue_error}");
        }
        return;
    }

    error!(
        score_id = item.score_id,
        tries = item.tries + 1,
        error = e.code(),
        "Score processing failed, quarantining"
    );
    if let Err(quarantine_error) = queue.quarantine(item).await {
        error!(score_id = item.score_id, "Failed to quarantine score: {quarantine_error}");
    }
    if let Err(alert_error) =
        discord::quarantined(options.discord_webhook_url.as_deref(), item, e.code()).await
    {
        warn!(score_id = item.score_id, error = alert_error.code(), "Failed to send quarantine alert");
    }
}
