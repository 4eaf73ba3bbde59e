use crate::models::beatmaps::{Beatmap, BeatmapPack, RankedStatus};
use crate::models::rulesets::Ruleset;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct BeatmapRow {
    pub beatmap_id: u32,
    pub beatmapset_id: u32,
    pub playmode: i8,
    pub approved: i8,
    pub total_length: u32,
    pub hit_length: u32,
    #[sqlx(rename = "countNormal")]
    pub count_normal: u32,
    #[sqlx(rename = "countSlider")]
    pub count_slider: u32,
    #[sqlx(rename = "countSpinner")]
    pub count_spinner: u32,
    #[sqlx(default)]
    pub max_combo: Option<u32>,
    pub diff_size: f32,
}

impl TryFrom<BeatmapRow> for Beatmap {
    type Error = std::io::Error;

    fn try_from(row: BeatmapRow) -> Result<Self, Self::Error> {
        Ok(Beatmap {
            beatmap_id: row.beatmap_id,
            beatmapset_id: row.beatmapset_id,
            ruleset: Ruleset::try_from(row.playmode as u8)?,
            ranked_status: RankedStatus::from(row.approved),
            total_length: row.total_length,
            hit_length: row.hit_length,
            count_normal: row.count_normal,
            count_slider: row.count_slider,
            count_spinner: row.count_spinner,
            max_combo: row.max_combo,
            diff_size: row.diff_size,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct BeatmapPackRow {
    pub pack_id: u32,
    pub tag: String,
    #[sqlx(default)]
    pub playmode: Option<i8>,
    pub no_diff_reduction: bool,
    #[sqlx(default)]
    pub achievement_id: Option<u32>,
}

impl BeatmapPackRow {
    pub fn into_model(self, beatmapset_ids: Vec<u32>) -> Result<BeatmapPack, std::io::Error> {
        let ruleset = match self.playmode {
            Some(mode) => Some(Ruleset::try_from(mode as u8)?),
            None => None,
        };
        Ok(BeatmapPack {
            pack_id: self.pack_id,
            tag: self.tag,
            beatmapset_ids,
            ruleset,
            no_diff_reduction: self.no_diff_reduction,
            achievement_id: self.achievement_id,
        })
    }
}
