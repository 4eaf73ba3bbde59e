mod common;

use common::{Harness, score};
use score_statistics_processor::adapters::queue::{MemoryScoreQueue, ScoreQueue};
use score_statistics_processor::common::context::Context;
use score_statistics_processor::models::queue::ScoreItem;
use score_statistics_processor::models::scores::ScoreRank;
use score_statistics_processor::processors::CURRENT_VERSION;
use score_statistics_processor::storage::Storage;
use score_statistics_processor::storage::memory::MemoryStorage;
use score_statistics_processor::usecases::queue;
use score_statistics_processor::workers::daemons::score_statistics::worker::{
    WorkerOptions, handle_item, run_worker,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn options(max_tries: u32) -> WorkerOptions {
    WorkerOptions {
        max_tries,
        dequeue_timeout: Duration::from_millis(20),
        discord_webhook_url: None,
    }
}

#[tokio::test]
async fn retryable_failures_are_requeued_until_exhausted() {
    let harness = Harness::new().await;
    let mut orphan = score(1, 100_000, ScoreRank::A);
    orphan.beatmap_id = 999;
    harness.storage.insert_score(orphan).await;
    let queue = MemoryScoreQueue::new();
    let options = options(3);

    let mut item = ScoreItem::new(1);
    for expected_tries in 1..3 {
        handle_item(&harness.processor, &queue, &item, &options).await;
        let pending = queue.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].tries, expected_tries);
        item = queue.dequeue(Duration::ZERO).await.unwrap().unwrap();
    }

    handle_item(&harness.processor, &queue, &item, &options).await;
    assert!(queue.is_empty());
    assert_eq!(queue.failed(), vec![item]);
}

#[tokio::test]
async fn hard_failures_are_quarantined_immediately() {
    let harness = Harness::new().await;
    let queue = MemoryScoreQueue::new();

    handle_item(&harness.processor, &queue, &ScoreItem::new(404), &options(5)).await;

    assert!(queue.is_empty());
    assert_eq!(queue.failed(), vec![ScoreItem::new(404)]);
}

#[tokio::test]
async fn worker_drains_queue_until_cancelled() {
    let harness = Harness::new().await;
    let queue = Arc::new(MemoryScoreQueue::new());
    for score_id in 1..=3 {
        harness
            .storage
            .insert_score(score(score_id, 100_000 * score_id, ScoreRank::A))
            .await;
        queue.enqueue(&ScoreItem::new(score_id)).await.unwrap();
    }
    queue.enqueue(&ScoreItem::new(2)).await.unwrap();

    let storage = harness.storage.clone();
    let processor = Arc::new(harness.processor);
    let cancellation = CancellationToken::new();
    let worker = tokio::spawn(run_worker(
        0,
        processor,
        queue.clone(),
        cancellation.clone(),
        options(3),
    ));

    for _ in 0..200 {
        if queue.is_empty() && storage.process_history(3).await.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cancellation.cancel();
    worker.await.unwrap();

    let stats = storage.user_stats(common::USER_ID, Default::default()).await.unwrap();
    assert_eq!(stats.playcount, 3);
    assert!(queue.failed().is_empty());
}

struct TestContext {
    storage: MemoryStorage,
    queue: MemoryScoreQueue,
}

impl Context for TestContext {
    fn storage(&self) -> &dyn Storage {
        &self.storage
    }

    fn queue(&self) -> &dyn ScoreQueue {
        &self.queue
    }
}

#[tokio::test]
async fn requeues_scores_with_outdated_markers() {
    let ctx = TestContext {
        storage: MemoryStorage::new(),
        queue: MemoryScoreQueue::new(),
    };
    for score_id in 1..=5 {
        ctx.storage.insert_score(score(score_id, 100_000, ScoreRank::A)).await;
    }
    ctx.storage.set_process_history(1, CURRENT_VERSION).await;
    ctx.storage.set_process_history(2, CURRENT_VERSION - 1).await;
    ctx.storage.set_process_history(4, CURRENT_VERSION).await;

    let queued = queue::requeue_outdated(&ctx, CURRENT_VERSION, 2).await.unwrap();

    assert_eq!(queued, 3);
    let ids: Vec<u64> = ctx.queue.pending().iter().map(|item| item.score_id).collect();
    assert_eq!(ids, vec![2, 3, 5]);
    assert!(ctx.queue.pending().iter().all(|item| !item.force_reprocess));
}
