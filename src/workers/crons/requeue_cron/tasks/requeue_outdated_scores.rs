use crate::common::context::Context;
use crate::common::error::ServiceResult;
use crate::processors::CURRENT_VERSION;
use crate::settings::AppSettings;
use crate::usecases::queue;
use tracing::info;

pub async fn requeue_outdated_scores<C: Context>(ctx: &C) -> ServiceResult<u64> {
    let batch_size = AppSettings::get().requeue_batch_size;
    let queued = queue::requeue_outdated(ctx, CURRENT_VERSION, batch_size).await?;
    info!(queued, version = CURRENT_VERSION, "Requeued outdated scores");
    Ok(queued)
}
