use crate::common::error::ServiceResult;
use crate::models::scores::HitStatistics;
use crate::models::stats::UserStats;
use crate::processors::versioning::Behaviours;
use crate::processors::{ProcessContext, StatProcessor};
use async_trait::async_trait;

const HISTORY: Behaviours<()> = Behaviours::new(&[(2, ())]);

pub struct HitStatisticsProcessor;

fn adjust(stats: &mut UserStats, hits: &HitStatistics, sign: i64) {
    stats.count_300 += sign * (hits.great + hits.perfect) as i64;
    stats.count_100 += sign * (hits.ok + hits.good) as i64;
    stats.count_50 += sign * hits.meh as i64;
    stats.count_miss += sign * hits.miss as i64;
}

#[async_trait]
impl StatProcessor for HitStatisticsProcessor {
    fn name(&self) -> &'static str {
        "hit_statistics"
    }

    fn runs_on_failed_scores(&self) -> bool {
        true
    }

    fn runs_on_legacy_scores(&self) -> bool {
        false
    }

    async fn apply(&self, ctx: &mut ProcessContext<'_>) -> ServiceResult<()> {
        if HISTORY.is_active(ctx.version) {
            adjust(ctx.stats, &ctx.score.statistics, 1);
        }
        Ok(())
    }

    async fn revert(&self, ctx: &mut ProcessContext<'_>, previous_version: u32) -> ServiceResult<()> {
        if HISTORY.is_active(previous_version) {
            adjust(ctx.stats, &ctx.score.statistics, -1);
        }
        Ok(())
    }
}
