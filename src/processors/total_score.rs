use crate::common::error::ServiceResult;
use crate::processors::level::level_for_score;
use crate::processors::versioning::Behaviours;
use crate::processors::{ProcessContext, StatProcessor};
use async_trait::async_trait;

const HISTORY: Behaviours<()> = Behaviours::new(&[(1, ())]);

/// Sums the classic total score of every play and derives the level from it.
pub struct TotalScoreProcessor;

#[async_trait]
impl StatProcessor for TotalScoreProcessor {
    fn name(&self) -> &'static str {
        "total_score"
    }

    fn runs_on_failed_scores(&self) -> bool {
        true
    }

    fn runs_on_legacy_scores(&self) -> bool {
        false
    }

    async fn apply(&self, ctx: &mut ProcessContext<'_>) -> ServiceResult<()> {
        if HISTORY.is_active(ctx.version) {
            ctx.stats.total_score += ctx.score.classic_total_score();
            ctx.stats.level = level_for_score(ctx.stats.total_score);
        }
        Ok(())
    }

    async fn revert(&self, ctx: &mut ProcessContext<'_>, previous_version: u32) -> ServiceResult<()> {
        if HISTORY.is_active(previous_version) {
            ctx.stats.total_score -= ctx.score.classic_total_score();
            ctx.stats.level = level_for_score(ctx.stats.total_score);
        }
        Ok(())
    }
}
