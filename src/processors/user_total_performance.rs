use crate::common::error::ServiceResult;
use crate::models::performance::PerformanceSampleFilter;
use crate::processors::versioning::Behaviours;
use crate::processors::{ORDER_USER_PERFORMANCE, ProcessContext, StatProcessor};
use crate::usecases::performance::weighted_performance;
use async_trait::async_trait;

const HISTORY: Behaviours<()> = Behaviours::new(&[(4, ())]);

/// Recomputes the user's weighted pp and accuracy from their best scores.
pub struct UserTotalPerformanceProcessor;

async fn recompute(ctx: &mut ProcessContext<'_>, filter: PerformanceSampleFilter) -> ServiceResult<()> {
    let (user_id, ruleset) = (ctx.score.user_id, ctx.score.ruleset);
    let samples = ctx
        .tx
        .fetch_performance_samples(user_id, ruleset, filter)
        .await?;
    let weighted = weighted_performance(&samples);
    ctx.stats.pp = weighted.pp;
    ctx.stats.accuracy = weighted.accuracy;
    Ok(())
}

#[async_trait]
impl StatProcessor for UserTotalPerformanceProcessor {
    fn name(&self) -> &'static str {
        "user_total_performance"
    }

    fn order(&self) -> i32 {
        ORDER_USER_PERFORMANCE
    }

    fn runs_on_failed_scores(&self) -> bool {
        false
    }

    fn runs_on_legacy_scores(&self) -> bool {
        true
    }

    async fn apply(&self, ctx: &mut ProcessContext<'_>) -> ServiceResult<()> {
        if !HISTORY.is_active(ctx.version) {
            return Ok(());
        }
        let filter = PerformanceSampleFilter::including(ctx.score.score_id);
        recompute(ctx, filter).await
    }

    async fn revert(&self, ctx: &mut ProcessContext<'_>, previous_version: u32) -> ServiceResult<()> {
        if !HISTORY.is_active(previous_version) {
            return Ok(());
        }
        let filter = PerformanceSampleFilter::excluding(ctx.score.score_id);
        recompute(ctx, filter).await
    }
}
