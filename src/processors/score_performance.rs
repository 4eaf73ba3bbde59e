use crate::common::error::ServiceResult;
use crate::processors::versioning::Behaviours;
use crate::processors::{ProcessContext, StatProcessor};
use async_trait::async_trait;
use tracing::warn;

const HISTORY: Behaviours<()> = Behaviours::new(&[(4, ())]);

/// Computes the score's pp and stores it on the score row.
pub struct ScorePerformanceProcessor;

#[async_trait]
impl StatProcessor for ScorePerformanceProcessor {
    fn name(&self) -> &'static str {
        "score_performance"
    }

    fn runs_on_failed_scores(&self) -> bool {
        false
    }

    fn runs_on_legacy_scores(&self) -> bool {
        true
    }

    async fn apply(&self, ctx: &mut ProcessContext<'_>) -> ServiceResult<()> {
        if !HISTORY.is_active(ctx.version) || !ctx.beatmap.ranked_status.is_ranked() {
            return Ok(());
        }

        let (score, beatmap) = (ctx.score, ctx.beatmap);
        let attributes = match ctx
            .beatmaps
            .fetch_difficulty_attributes(beatmap, score.ruleset, &score.mods)
            .await
        {
            Ok(Some(attributes)) => attributes,
            Ok(None) => {
                warn!(
                    score_id = score.score_id,
                    beatmap_id = beatmap.beatmap_id,
                    "No difficulty attributes, skipping performance"
                );
                return Ok(());
            }
            Err(e) => {
                warn!(
                    score_id = score.score_id,
                    beatmap_id = beatmap.beatmap_id,
                    error = e.code(),
                    "Failed to fetch difficulty attributes, skipping performance"
                );
                return Ok(());
            }
        };

        let pp = match ctx
            .beatmaps
            .compute_performance(score, beatmap, &attributes)
            .await
        {
            Ok(pp) => pp,
            Err(e) => {
                warn!(
                    score_id = score.score_id,
                    error = e.code(),
                    "Failed to compute performance, skipping"
                );
                return Ok(());
            }
        };

        ctx.tx.update_score_performance(score.score_id, Some(pp)).await?;
        Ok(())
    }

    /// The stored value stays; aggregates stop counting the score on their own revert.
    async fn revert(&self, _ctx: &mut ProcessContext<'_>, _previous_version: u32) -> ServiceResult<()> {
        Ok(())
    }
}
