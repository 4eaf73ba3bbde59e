use crate::common::error::ServiceResult;
use crate::models::medals::MedalDefinition;
use crate::processors::medals::{MedalAwarder, MedalContext};
use async_trait::async_trait;

/// Pack medal slugs all carry this marker, e.g. `all-packs-anime-1`.
const PACK_SLUG_MARKER: &str = "pack";

/// Awards pack medals once every beatmapset of the pack has been passed.
pub struct BeatmapPackAwarder;

#[async_trait]
impl MedalAwarder for BeatmapPackAwarder {
    fn name(&self) -> &'static str {
        "beatmap_packs"
    }

    async fn award(
        &self,
        ctx: &mut MedalContext<'_>,
        candidates: &[MedalDefinition],
    ) -> ServiceResult<Vec<MedalDefinition>> {
        let mut awarded = vec![];
        let pack_medals = candidates
            .iter()
            .filter(|medal| medal.slug.contains(PACK_SLUG_MARKER));
        for medal in pack_medals {
            let Some(pack) = ctx.tx.fetch_beatmap_pack_for_medal(medal.achievement_id).await? else {
                continue;
            };
            if pack.beatmapset_ids.is_empty()
                || !pack.beatmapset_ids.contains(&ctx.beatmap.beatmapset_id)
                || pack.ruleset.is_some_and(|ruleset| ruleset != ctx.score.ruleset)
                || (pack.no_diff_reduction && ctx.score.has_difficulty_reduction())
            {
                continue;
            }

            let completed = ctx
                .tx
                .count_completed_pack_sets(ctx.score.user_id, &pack)
                .await?;
            if completed as usize >= pack.beatmapset_ids.len() {
                awarded.push(medal.clone());
            }
        }
        Ok(awarded)
    }
}
