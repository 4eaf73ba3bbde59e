use crate::common::error::ServiceResult;
use crate::models::medals::MedalDefinition;
use crate::processors::medals::awarders::slug_threshold;
use crate::processors::medals::{MedalAwarder, MedalContext};
use async_trait::async_trait;

/// Awards `<ruleset>-rank-top-<p>` once the user's pp rank is within the top p percent.
pub struct PercentileAwarder;

#[async_trait]
impl MedalAwarder for PercentileAwarder {
    fn name(&self) -> &'static str {
        "percentile"
    }

    async fn award(
        &self,
        ctx: &mut MedalContext<'_>,
        candidates: &[MedalDefinition],
    ) -> ServiceResult<Vec<MedalDefinition>> {
        let ruleset = ctx.score.ruleset;
        let prefix = format!("{}-rank-top-", ruleset.short_name());
        if ctx.stats.pp <= 0.0 || !candidates.iter().any(|m| m.slug.starts_with(&prefix)) {
            return Ok(vec![]);
        }

        let (rank, ranked_users) = ctx
            .tx
            .fetch_performance_rank(ctx.stats.user_id, ruleset, ctx.stats.pp)
            .await?;
        let percentile = rank as f64 * 100.0 / ranked_users.max(1) as f64;

        Ok(candidates
            .iter()
            .filter(|medal| {
                slug_threshold(&medal.slug, &prefix).is_some_and(|top| percentile <= top as f64)
            })
            .cloned()
            .collect())
    }
}
