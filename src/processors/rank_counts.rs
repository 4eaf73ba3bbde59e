use crate::common::error::ServiceResult;
use crate::models::scores::Score;
use crate::models::stats::RankCounts;
use crate::processors::versioning::Behaviours;
use crate::processors::{ProcessContext, StatProcessor};
use crate::usecases::best_scores::{self, BestScoreDelta};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankCounting {
    /// XH and SH were tallied as X and S.
    FoldSilver,
    Separate,
}

impl RankCounting {
    const fn folds_silver(&self) -> bool {
        matches!(self, RankCounting::FoldSilver)
    }
}

pub const HISTORY: Behaviours<RankCounting> =
    Behaviours::new(&[(1, RankCounting::FoldSilver), (5, RankCounting::Separate)]);

/// Tallies the rank of the best score on each beatmap.
pub struct RankCountsProcessor;

pub fn add_rank(counts: &mut RankCounts, score: &Score, counting: RankCounting) {
    counts.adjust(score.rank, 1, counting.folds_silver());
}

pub fn remove_rank(counts: &mut RankCounts, score: &Score, counting: RankCounting) {
    counts.adjust(score.rank, -1, counting.folds_silver());
}

/// Moves the tally from the removed best to the added one. Each side is counted the way
/// its own version counted ranks, and not at all when that version tracked no ranks.
pub fn apply_delta(counts: &mut RankCounts, delta: &BestScoreDelta) {
    if let Some(removed) = &delta.remove {
        if let Some(counting) = HISTORY.at(removed.version) {
            remove_rank(counts, &removed.score, counting);
        }
    }
    if let Some(added) = &delta.add {
        if let Some(counting) = HISTORY.at(added.version) {
            add_rank(counts, &added.score, counting);
        }
    }
}

#[async_trait]
impl StatProcessor for RankCountsProcessor {
    fn name(&self) -> &'static str {
        "rank_counts"
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
        apply_delta(&mut ctx.stats.rank_counts, &delta);
        Ok(())
    }

    /// Runs even when `previous_version` tracked no ranks, since the restored runner-up
    /// may have been counted under a version that did.
    async fn revert(&self, ctx: &mut ProcessContext<'_>, previous_version: u32) -> ServiceResult<()> {
        let delta = best_scores::delta_on_revert(ctx.tx, ctx.score, previous_version).await?;
        apply_delta(&mut ctx.stats.rank_counts, &delta);
        Ok(())
    }
}
