pub mod awarders;

use crate::common::error::ServiceResult;
use crate::models::beatmaps::Beatmap;
use crate::models::medals::MedalDefinition;
use crate::models::notifications::PostCommitAction;
use crate::models::scores::Score;
use crate::models::stats::UserStats;
use crate::processors::versioning::Behaviours;
use crate::processors::{ORDER_MEDALS, ProcessContext, StatProcessor};
use crate::storage::StorageTransaction;
use crate::usecases::beatmaps::BeatmapLookup;
use crate::usecases::medals::MedalDefinitionCache;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

const HISTORY: Behaviours<()> = Behaviours::new(&[(7, ())]);

/// What an awarder may look at. The aggregate already includes the current score.
pub struct MedalContext<'a> {
    pub score: &'a Score,
    pub beatmap: &'a Beatmap,
    pub stats: &'a UserStats,
    pub tx: &'a mut dyn StorageTransaction,
    pub beatmaps: &'a BeatmapLookup,
}

#[async_trait]
pub trait MedalAwarder: Send + Sync {
    fn name(&self) -> &'static str;

    fn runs_on_failed_scores(&self) -> bool {
        false
    }

    fn runs_on_legacy_scores(&self) -> bool {
        false
    }

    /// Returns the subset of `candidates` earned by the score.
    async fn award(
        &self,
        ctx: &mut MedalContext<'_>,
        candidates: &[MedalDefinition],
    ) -> ServiceResult<Vec<MedalDefinition>>;
}

pub struct MedalProcessor {
    definitions: Arc<MedalDefinitionCache>,
    awarders: Vec<Box<dyn MedalAwarder>>,
}

fn runs_on(awarder: &dyn MedalAwarder, score: &Score) -> bool {
    (score.passed || awarder.runs_on_failed_scores())
        && (!score.is_legacy() || awarder.runs_on_legacy_scores())
}

impl MedalProcessor {
    pub fn new(definitions: Arc<MedalDefinitionCache>) -> Self {
        Self {
            definitions,
            awarders: awarders::all(),
        }
    }

    async fn candidates(&self, ctx: &mut ProcessContext<'_>) -> ServiceResult<Vec<MedalDefinition>> {
        let granted = ctx.tx.fetch_granted_medal_ids(ctx.score.user_id).await?;
        let candidates = self
            .definitions
            .fetch_all(&mut *ctx.tx)
            .await?
            .iter()
            .filter(|medal| medal.applies_to(ctx.score.ruleset))
            .filter(|medal| !granted.contains(&medal.achievement_id))
            .cloned()
            .collect();
        Ok(candidates)
    }
}

#[async_trait]
impl StatProcessor for MedalProcessor {
    fn name(&self) -> &'static str {
        "medals"
    }

    fn order(&self) -> i32 {
        ORDER_MEDALS
    }

    fn runs_on_failed_scores(&self) -> bool {
        true
    }

    fn runs_on_legacy_scores(&self) -> bool {
        false
    }

    async fn apply(&self, ctx: &mut ProcessContext<'_>) -> ServiceResult<()> {
        if !HISTORY.is_active(ctx.version) || !ctx.beatmap.ranked_status.is_ranked() {
            return Ok(());
        }
        if ctx.tx.is_user_restricted(ctx.score.user_id).await? {
            return Ok(());
        }

        let mut candidates = self.candidates(ctx).await?;
        let mut medal_ctx = MedalContext {
            score: ctx.score,
            beatmap: ctx.beatmap,
            stats: &*ctx.stats,
            tx: &mut *ctx.tx,
            beatmaps: ctx.beatmaps,
        };

        for awarder in &self.awarders {
            if candidates.is_empty() {
                break;
            }
            if !runs_on(awarder.as_ref(), medal_ctx.score) {
                continue;
            }

            let awarded = awarder.award(&mut medal_ctx, &candidates).await?;
            for medal in awarded {
                debug!(
                    score_id = medal_ctx.score.score_id,
                    awarder = awarder.name(),
                    slug = %medal.slug,
                    "Medal earned"
                );
                candidates.retain(|candidate| candidate.achievement_id != medal.achievement_id);
                ctx.actions.push(PostCommitAction::GrantMedal {
                    user_id: medal_ctx.score.user_id,
                    medal,
                    beatmap_id: Some(medal_ctx.beatmap.beatmap_id),
                });
            }
        }
        Ok(())
    }

    /// Medals are never taken away.
    async fn revert(&self, _ctx: &mut ProcessContext<'_>, _previous_version: u32) -> ServiceResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scores::ScoreRank;
    use crate::models::scores::tests::sample_score;

    struct FailedScoresOnly;

    #[async_trait]
    impl MedalAwarder for FailedScoresOnly {
        fn name(&self) -> &'static str {
            "failed_scores_only"
        }

        fn runs_on_failed_scores(&self) -> bool {
            true
        }

        async fn award(
            &self,
            _ctx: &mut MedalContext<'_>,
            _candidates: &[MedalDefinition],
        ) -> ServiceResult<Vec<MedalDefinition>> {
            Ok(vec![])
        }
    }

    #[test]
    fn awarders_skip_legacy_scores_by_default() {
        let awarder = FailedScoresOnly;
        let mut score = sample_score(1, 1000, ScoreRank::A);
        assert!(runs_on(&awarder, &score));

        score.passed = false;
        assert!(runs_on(&awarder, &score));

        score.legacy_score_id = Some(10);
        assert!(!runs_on(&awarder, &score));
    }

    #[test]
    fn registered_awarders_leave_legacy_scores_alone() {
        let mut score = sample_score(1, 1000, ScoreRank::A);
        score.legacy_score_id = Some(10);
        assert!(awarders::all().iter().all(|awarder| !runs_on(awarder.as_ref(), &score)));
    }
}
