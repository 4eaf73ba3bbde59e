use crate::models::rulesets::Ruleset;

#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankedStatus {
    Graveyard = -2,
    WorkInProgress = -1,
    Pending = 0,
    Ranked = 1,
    Approved = 2,
    Qualified = 3,
    Loved = 4,
}

impl RankedStatus {
    /// Whether scores on the beatmap award performance and medals.
    pub const fn is_ranked(&self) -> bool {
        matches!(self, RankedStatus::Ranked | RankedStatus::Approved)
    }
}

impl From<i8> for RankedStatus {
    fn from(value: i8) -> Self {
        match value {
            -2 => Self::Graveyard,
            -1 => Self::WorkInProgress,
            1 => Self::Ranked,
            2 => Self::Approved,
            3 => Self::Qualified,
            4 => Self::Loved,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Beatmap {
    pub beatmap_id: u32,
    pub beatmapset_id: u32,
    pub ruleset: Ruleset,
    pub ranked_status: RankedStatus,
    pub total_length: u32,
    pub hit_length: u32,
    pub count_normal: u32,
    pub count_slider: u32,
    pub count_spinner: u32,
    pub max_combo: Option<u32>,
    /// Key count on mania beatmaps.
    pub diff_size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyAttributes {
    pub star_rating: f64,
    pub max_combo: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeatmapPack {
    pub pack_id: u32,
    pub tag: String,
    pub beatmapset_ids: Vec<u32>,
    pub ruleset: Option<Ruleset>,
    /// Challenge packs must be cleared without difficulty reduction mods.
    pub no_diff_reduction: bool,
    pub achievement_id: Option<u32>,
}
