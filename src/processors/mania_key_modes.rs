use crate::common::error::ServiceResult;
use crate::models::rulesets::Ruleset;
use crate::models::stats::ManiaVariant;
use crate::processors::rank_counts::{self, RankCounting};
use crate::processors::versioning::Behaviours;
use crate::processors::{ProcessContext, StatProcessor};
use crate::usecases::best_scores::{self, BestScoreDelta, CountedScore};
use async_trait::async_trait;

const HISTORY: Behaviours<()> = Behaviours::new(&[(6, ())]);

/// Keeps ranked score and rank counts of the 4K and 7K mania leaderboards.
pub struct ManiaKeyModesProcessor;

fn variant_of(ctx: &ProcessContext<'_>) -> Option<ManiaVariant> {
    if ctx.score.ruleset != Ruleset::Mania || ctx.beatmap.ruleset != Ruleset::Mania {
        return None;
    }
    ManiaVariant::from_key_count(ctx.beatmap.diff_size)
}

/// A side of the delta only touches the variant row when its version tracked key modes.
fn tracked(counted: &Option<CountedScore>) -> Option<(&CountedScore, RankCounting)> {
    let counted = counted.as_ref()?;
    if !HISTORY.is_active(counted.version) {
        return None;
    }
    Some((counted, rank_counts::HISTORY.at(counted.version)?))
}

async fn apply_delta(
    ctx: &mut ProcessContext<'_>,
    variant: ManiaVariant,
    delta: &BestScoreDelta,
) -> ServiceResult<()> {
    let removed = tracked(&delta.remove);
    let added = tracked(&delta.add);
    if removed.is_none() && added.is_none() {
        return Ok(());
    }

    let mut stats = ctx
        .tx
        .fetch_variant_stats_for_update(ctx.score.user_id, variant)
        .await?;
    if let Some((removed, counting)) = removed {
        stats.ranked_score -= removed.score.classic_total_score();
        rank_counts::remove_rank(&mut stats.rank_counts, &removed.score, counting);
    }
    if let Some((added, counting)) = added {
        stats.ranked_score += added.score.classic_total_score();
        rank_counts::add_rank(&mut stats.rank_counts, &added.score, counting);
    }
    ctx.tx.save_variant_stats(&stats).await?;
    Ok(())
}

#[async_trait]
impl StatProcessor for ManiaKeyModesProcessor {
    fn name(&self) -> &'static str {
        "mania_key_modes"
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
        let Some(variant) = variant_of(ctx) else {
            return Ok(());
        };

        let delta = best_scores::delta_on_apply(ctx.tx, ctx.score, ctx.version).await?;
        apply_delta(ctx, variant, &delta).await
    }

    /// Runs even when `previous_version` predates key modes, since the restored runner-up
    /// may have been counted under a version that had them.
    async fn revert(&self, ctx: &mut ProcessContext<'_>, previous_version: u32) -> ServiceResult<()> {
        let Some(variant) = variant_of(ctx) else {
            return Ok(());
        };

        let delta = best_scores::delta_on_revert(ctx.tx, ctx.score, previous_version).await?;
        apply_delta(ctx, variant, &delta).await
    }
}
