use crate::common::error::ServiceResult;
use crate::models::medals::MedalDefinition;
use crate::processors::medals::awarders::slug_threshold;
use crate::processors::medals::{MedalAwarder, MedalContext};
use async_trait::async_trait;

/// Beatmap whose star rating is known to be wrong and must not count towards skill medals.
const UNRELIABLE_RATING_BEATMAP_ID: u32 = 1_257_904;

/// Awards pass and full combo medals for the star rating band of the beatmap.
pub struct StarRatingAwarder;

#[async_trait]
impl MedalAwarder for StarRatingAwarder {
    fn name(&self) -> &'static str {
        "star_rating"
    }

    async fn award(
        &self,
        ctx: &mut MedalContext<'_>,
        candidates: &[MedalDefinition],
    ) -> ServiceResult<Vec<MedalDefinition>> {
        let score = ctx.score;
        if !score.passed
            || !score.ranked
            || score.has_difficulty_reduction()
            || ctx.beatmap.beatmap_id == UNRELIABLE_RATING_BEATMAP_ID
        {
            return Ok(vec![]);
        }

        let pass_prefix = format!("{}-skill-pass-", score.ruleset.short_name());
        let fc_prefix = format!("{}-skill-fc-", score.ruleset.short_name());
        let relevant: Vec<&MedalDefinition> = candidates
            .iter()
            .filter(|medal| {
                medal.slug.starts_with(&pass_prefix) || medal.slug.starts_with(&fc_prefix)
            })
            .collect();
        if relevant.is_empty() {
            return Ok(vec![]);
        }

        let Some(attributes) = ctx
            .beatmaps
            .fetch_difficulty_attributes(ctx.beatmap, score.ruleset, &score.mods)
            .await?
        else {
            return Ok(vec![]);
        };
        let band = attributes.star_rating.floor() as u64;

        let awarded = relevant
            .into_iter()
            .filter(|medal| {
                if let Some(stars) = slug_threshold(&medal.slug, &pass_prefix) {
                    return stars == band;
                }
                slug_threshold(&medal.slug, &fc_prefix)
                    .is_some_and(|stars| stars == band && score.is_full_combo())
            })
            .cloned()
            .collect();
        Ok(awarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mods::ScoreMod;
    use crate::models::scores::tests::sample_score;
    use crate::models::scores::{Score, ScoreRank};
    use crate::models::stats::UserStats;
    use crate::processors::medals::awarders::tests::{award_ids, medal, ranked_beatmap};
    use crate::storage::memory::MemoryStorage;
    use rstest::rstest;

    async fn award(score: &Score, beatmap_id: u32, rating: Option<f64>) -> Vec<u32> {
        let candidates = [
            medal(1, "osu-skill-pass-4"),
            medal(2, "osu-skill-pass-5"),
            medal(3, "osu-skill-fc-5"),
            medal(4, "osu-skill-pass-6"),
            medal(5, "taiko-skill-pass-5"),
        ];
        let stats = UserStats::new(score.user_id, score.ruleset);
        award_ids(
            &StarRatingAwarder,
            &MemoryStorage::new(),
            score,
            &ranked_beatmap(beatmap_id, 10),
            &stats,
            rating,
            &candidates,
        )
        .await
    }

    #[rstest]
    #[case::bottom_of_band(5.0, vec![2, 3])]
    #[case::top_of_band(5.99, vec![2, 3])]
    #[case::next_band(6.0, vec![4])]
    #[case::lower_band(4.2, vec![1])]
    #[case::no_tier(7.5, vec![])]
    #[tokio::test]
    async fn awards_the_band_of_the_rating(#[case] rating: f64, #[case] expected: Vec<u32>) {
        let score = sample_score(1, 1_000_000, ScoreRank::S);
        assert_eq!(award(&score, 100, Some(rating)).await, expected);
    }

    #[tokio::test]
    async fn misses_only_earn_the_pass_medal() {
        let mut score = sample_score(1, 1_000_000, ScoreRank::A);
        score.statistics.miss = 1;
        assert_eq!(award(&score, 100, Some(5.4)).await, vec![2]);
    }

    #[tokio::test]
    async fn difficulty_reduction_earns_nothing() {
        let mut score = sample_score(1, 1_000_000, ScoreRank::S);
        score.mods = vec![ScoreMod::new("EZ")];
        assert!(award(&score, 100, Some(5.4)).await.is_empty());
    }

    #[tokio::test]
    async fn unreliable_beatmap_earns_nothing() {
        let score = sample_score(1, 1_000_000, ScoreRank::S);
        assert!(award(&score, UNRELIABLE_RATING_BEATMAP_ID, Some(5.4)).await.is_empty());
    }

    #[tokio::test]
    async fn unrated_or_failed_scores_earn_nothing() {
        let mut score = sample_score(1, 1_000_000, ScoreRank::S);
        assert!(award(&score, 100, None).await.is_empty());

        score.passed = false;
        assert!(award(&score, 100, Some(5.4)).await.is_empty());
    }
}
