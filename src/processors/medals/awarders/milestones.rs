use crate::common::error::ServiceResult;
use crate::models::medals::MedalDefinition;
use crate::models::rulesets::Ruleset;
use crate::processors::medals::awarders::slug_threshold;
use crate::processors::medals::{MedalAwarder, MedalContext};
use async_trait::async_trait;

fn reached(candidates: &[MedalDefinition], prefix: &str, value: u64) -> Vec<MedalDefinition> {
    candidates
        .iter()
        .filter(|medal| slug_threshold(&medal.slug, prefix).is_some_and(|target| value >= target))
        .cloned()
        .collect()
}

/// Max combo of a single osu! play.
pub struct ComboMilestoneAwarder;

#[async_trait]
impl MedalAwarder for ComboMilestoneAwarder {
    fn name(&self) -> &'static str {
        "combo_milestones"
    }

    async fn award(
        &self,
        ctx: &mut MedalContext<'_>,
        candidates: &[MedalDefinition],
    ) -> ServiceResult<Vec<MedalDefinition>> {
        if ctx.score.ruleset != Ruleset::Osu {
            return Ok(vec![]);
        }
        Ok(reached(candidates, "osu-combo-", ctx.score.max_combo as u64))
    }
}

/// Total osu! play count.
pub struct PlayCountMilestoneAwarder;

#[async_trait]
impl MedalAwarder for PlayCountMilestoneAwarder {
    fn name(&self) -> &'static str {
        "play_count_milestones"
    }

    fn runs_on_failed_scores(&self) -> bool {
        true
    }

    async fn award(
        &self,
        ctx: &mut MedalContext<'_>,
        candidates: &[MedalDefinition],
    ) -> ServiceResult<Vec<MedalDefinition>> {
        if ctx.score.ruleset != Ruleset::Osu {
            return Ok(vec![]);
        }
        let playcount = ctx.stats.playcount.max(0) as u64;
        Ok(reached(candidates, "osu-plays-", playcount))
    }
}

/// Total hits in taiko, catch and mania.
pub struct HitCountMilestoneAwarder;

#[async_trait]
impl MedalAwarder for HitCountMilestoneAwarder {
    fn name(&self) -> &'static str {
        "hit_count_milestones"
    }

    fn runs_on_failed_scores(&self) -> bool {
        true
    }

    async fn award(
        &self,
        ctx: &mut MedalContext<'_>,
        candidates: &[MedalDefinition],
    ) -> ServiceResult<Vec<MedalDefinition>> {
        if ctx.score.ruleset == Ruleset::Osu {
            return Ok(vec![]);
        }
        let prefix = format!("{}-hits-", ctx.score.ruleset.short_name());
        let hits = ctx.stats.total_hits().max(0) as u64;
        Ok(reached(candidates, &prefix, hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::medals::awarders::tests::medal;

    #[test]
    fn awards_every_reached_tier() {
        let candidates = [
            medal(1, "osu-combo-500"),
            medal(2, "osu-combo-750"),
            medal(3, "osu-combo-1000"),
            medal(4, "osu-plays-5000"),
        ];
        let awarded = reached(&candidates, "osu-combo-", 800);
        let ids: Vec<u32> = awarded.iter().map(|m| m.achievement_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
