use crate::common::error::ServiceResult;
use crate::processors::versioning::Behaviours;
use crate::processors::{ProcessContext, StatProcessor};
use async_trait::async_trait;

const HISTORY: Behaviours<()> = Behaviours::new(&[(1, ())]);

/// Counts every play, passed or not.
pub struct PlayCountProcessor;

#[async_trait]
impl StatProcessor for PlayCountProcessor {
    fn name(&self) -> &'static str {
        "play_count"
    }

    fn runs_on_failed_scores(&self) -> bool {
        true
    }

    fn runs_on_legacy_scores(&self) -> bool {
        false
    }

    async fn apply(&self, ctx: &mut ProcessContext<'_>) -> ServiceResult<()> {
        if HISTORY.is_active(ctx.version) {
            ctx.stats.playcount += 1;
        }
        Ok(())
    }

    async fn revert(&self, ctx: &mut ProcessContext<'_>, previous_version: u32) -> ServiceResult<()> {
        if HISTORY.is_active(previous_version) {
            ctx.stats.playcount -= 1;
        }
        Ok(())
    }
}
