//! Static registry of the medal awarders. Awarders select the medals they handle by slug
//! so new tiers only need a definition row.

pub mod beatmap_packs;
pub mod daily_challenge;
pub mod milestones;
pub mod mod_introduction;
pub mod percentile;
pub mod star_rating;

use crate::processors::medals::MedalAwarder;

pub fn all() -> Vec<Box<dyn MedalAwarder>> {
    vec![
        Box::new(mod_introduction::ModIntroductionAwarder),
        Box::new(star_rating::StarRatingAwarder),
        Box::new(milestones::ComboMilestoneAwarder),
        Box::new(milestones::PlayCountMilestoneAwarder),
        Box::new(milestones::HitCountMilestoneAwarder),
        Box::new(percentile::PercentileAwarder),
        Box::new(beatmap_packs::BeatmapPackAwarder),
        Box::new(daily_challenge::DailyChallengeAwarder),
    ]
}

/// Numeric suffix of `slug` after `prefix`, e.g. `osu-combo-` in `osu-combo-750`.
pub(crate) fn slug_threshold(slug: &str, prefix: &str) -> Option<u64> {
    slug.strip_prefix(prefix)?.parse().ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::common::error::ServiceResult;
    use crate::models::beatmaps::{Beatmap, DifficultyAttributes, RankedStatus};
    use crate::models::medals::MedalDefinition;
    use crate::models::mods::ScoreMod;
    use crate::models::rulesets::Ruleset;
    use crate::models::scores::Score;
    use crate::models::stats::UserStats;
    use crate::processors::medals::MedalContext;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;
    use crate::usecases::beatmaps::{BeatmapLookup, DifficultyCalculator};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    /// Rates every beatmap at the given star rating, or leaves it unrated.
    pub struct FixedRating(pub Option<f64>);

    #[async_trait]
    impl DifficultyCalculator for FixedRating {
        async fn compute_attributes(
            &self,
            _beatmap: &Beatmap,
            _ruleset: Ruleset,
            _mods: &[ScoreMod],
        ) -> ServiceResult<Option<DifficultyAttributes>> {
            Ok(self.0.map(|star_rating| DifficultyAttributes {
                star_rating,
                max_combo: 100,
            }))
        }

        async fn compute_performance(
            &self,
            _score: &Score,
            _beatmap: &Beatmap,
            _attributes: &DifficultyAttributes,
        ) -> ServiceResult<f64> {
            Ok(0.0)
        }
    }

    /// Ids of the candidates `awarder` grants for `score` on a fresh ranked beatmap.
    pub async fn award_ids(
        awarder: &dyn MedalAwarder,
        storage: &MemoryStorage,
        score: &Score,
        beatmap: &Beatmap,
        stats: &UserStats,
        rating: Option<f64>,
        candidates: &[MedalDefinition],
    ) -> Vec<u32> {
        let beatmaps = BeatmapLookup::new(Arc::new(FixedRating(rating)), 4, Duration::from_secs(60));
        let mut tx = storage.begin().await.unwrap();
        let mut ctx = MedalContext {
            score,
            beatmap,
            stats,
            tx: tx.as_mut(),
            beatmaps: &beatmaps,
        };
        let awarded = awarder.award(&mut ctx, candidates).await.unwrap();
        tx.rollback().await.unwrap();
        awarded.iter().map(|medal| medal.achievement_id).collect()
    }

    pub fn medal(achievement_id: u32, slug: &str) -> MedalDefinition {
        MedalDefinition {
            achievement_id,
            slug: slug.to_owned(),
            name: slug.to_owned(),
            grouping: "Test".to_owned(),
            ordering: 0,
            ruleset: None,
            enabled: true,
        }
    }

    pub fn ranked_beatmap(beatmap_id: u32, beatmapset_id: u32) -> Beatmap {
        Beatmap {
            beatmap_id,
            beatmapset_id,
            ruleset: Ruleset::Osu,
            ranked_status: RankedStatus::Ranked,
            total_length: 120,
            hit_length: 100,
            count_normal: 5,
            count_slider: 0,
            count_spinner: 0,
            max_combo: Some(5),
            diff_size: 4.0,
        }
    }

    #[test]
    fn parses_slug_thresholds() {
        assert_eq!(slug_threshold("osu-combo-750", "osu-combo-"), Some(750));
        assert_eq!(slug_threshold("osu-combo-x", "osu-combo-"), None);
        assert_eq!(slug_threshold("taiko-hits-30000", "osu-combo-"), None);
    }

    #[test]
    fn registry_has_unique_names() {
        let mut names: Vec<_> = all().iter().map(|awarder| awarder.name()).collect();
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }
}
