use crate::common::context::Context;
use crate::common::error::ServiceResult;
use crate::models::queue::ScoreItem;
use tracing::info;

pub async fn enqueue<C: Context + ?Sized>(ctx: &C, item: &ScoreItem) -> ServiceResult<()> {
    ctx.queue().enqueue(item).await?;
    Ok(())
}

/// Queues every score whose marker is missing or older than `version`.
/// Returns how many items were queued.
pub async fn requeue_outdated<C: Context + ?Sized>(
    ctx: &C,
    version: u32,
    batch_size: u32,
) -> ServiceResult<u64> {
    let mut after_score_id = 0;
    let mut queued = 0;
    loop {
        let score_ids = ctx
            .storage()
            .fetch_outdated_score_ids(version, after_score_id, batch_size)
            .await?;
        let Some(&last_score_id) = score_ids.last() else {
            break;
        };

        for score_id in &score_ids {
            enqueue(ctx, &ScoreItem::new(*score_id)).await?;
        }
        queued += score_ids.len() as u64;
        after_score_id = last_score_id;
        info!(queued, after_score_id, "Queued outdated scores");

        if score_ids.len() < batch_size as usize {
            break;
        }
    }
    Ok(queued)
}
