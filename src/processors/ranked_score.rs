use crate::common::error::ServiceResult;
use crate::processors::versioning::Behaviours;
use crate::processors::{ProcessContext, StatProcessor};
use crate::usecases::best_scores::{self, BestScoreDelta, CountedScore};
use async_trait::async_trait;

const HISTORY: Behaviours<()> = Behaviours::new(&[(1, ())]);

/// Sums the classic total score of the best score on each beatmap.
pub struct RankedScoreProcessor;

fn contribution(counted: &Option<CountedScore>) -> i64 {
    match counted {
        Some(counted) if HISTORY.is_active(counted.version) => counted.score.classic_total_score(),
        _ => 0,
    }
}

fn apply_delta(ranked_score: &mut i64, delta: &BestScoreDelta) {
    *ranked_score += contribution(&delta.add) - contribution(&delta.remove);
}

#[async_trait]
impl StatProcessor for RankedScoreProcessor {
    fn name(&self) -> &'static str {
        "ranked_score"
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
        let delta = best_scores::delta_on_apply(ctx.tx, ctx.score, ctx.version).await?;
        apply_delta(&mut ctx.stats.ranked_score, &delta);
        Ok(())
    }

    async fn revert(&self, ctx: &mut ProcessContext<'_>, previous_version: u32) -> ServiceResult<()> {
        let delta = best_scores::delta_on_revert(ctx.tx, ctx.score, previous_version).await?;
        apply_delta(&mut ctx.stats.ranked_score, &delta);
        Ok(())
    }
}
