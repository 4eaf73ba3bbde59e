use crate::common::error::ServiceResult;
use crate::models::medals::MedalDefinition;
use crate::processors::medals::awarders::slug_threshold;
use crate::processors::medals::{MedalAwarder, MedalContext};
use async_trait::async_trait;

const PREFIX: &str = "daily-challenge-streak-";

pub struct DailyChallengeAwarder;

#[async_trait]
impl MedalAwarder for DailyChallengeAwarder {
    fn name(&self) -> &'static str {
        "daily_challenge"
    }

    async fn award(
        &self,
        ctx: &mut MedalContext<'_>,
        candidates: &[MedalDefinition],
    ) -> ServiceResult<Vec<MedalDefinition>> {
        if !candidates.iter().any(|medal| medal.slug.starts_with(PREFIX)) {
            return Ok(vec![]);
        }
        let Some(stats) = ctx.tx.fetch_daily_challenge_stats(ctx.score.user_id).await? else {
            return Ok(vec![]);
        };

        let best_streak = stats.daily_streak_best as u64;
        Ok(candidates
            .iter()
            .filter(|medal| slug_threshold(&medal.slug, PREFIX).is_some_and(|n| best_streak >= n))
            .cloned()
            .collect())
    }
}
