use crate::models::rulesets::Ruleset;
use crate::models::scores::ScoreRank;
use chrono::{DateTime, Utc};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserStats {
    pub user_id: u32,
    pub ruleset: Ruleset,
    pub playcount: i32,
    pub count_300: i64,
    pub count_100: i64,
    pub count_50: i64,
    pub count_miss: i64,
    pub total_score: i64,
    pub ranked_score: i64,
    pub level: f64,
    pub accuracy: f64,
    pub pp: f64,
    pub rank_counts: RankCounts,
    pub total_seconds_played: i64,
    pub last_played: Option<DateTime<Utc>>,
}

impl UserStats {
    pub fn new(user_id: u32, ruleset: Ruleset) -> Self {
        Self {
            user_id,
            ruleset,
            level: 1.0,
            ..Default::default()
        }
    }

    pub const fn total_hits(&self) -> i64 {
        self.count_300 + self.count_100 + self.count_50
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RankCounts {
    pub xh: i32,
    pub x: i32,
    pub sh: i32,
    pub s: i32,
    pub a: i32,
}

impl RankCounts {
    /// Adjusts the tally for `rank`. With `fold_silver`, XH and SH count towards X and S.
    pub fn adjust(&mut self, rank: ScoreRank, delta: i32, fold_silver: bool) {
        let slot = match (rank, fold_silver) {
            (ScoreRank::XH, false) => &mut self.xh,
            (ScoreRank::XH, true) | (ScoreRank::X, _) => &mut self.x,
            (ScoreRank::SH, false) => &mut self.sh,
            (ScoreRank::SH, true) | (ScoreRank::S, _) => &mut self.s,
            (ScoreRank::A, _) => &mut self.a,
            _ => return,
        };
        *slot += delta;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManiaVariant {
    FourKey,
    SevenKey,
}

impl ManiaVariant {
    pub fn from_key_count(keys: f32) -> Option<Self> {
        match keys.round() as i32 {
            4 => Some(ManiaVariant::FourKey),
            7 => Some(ManiaVariant::SevenKey),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ManiaVariant::FourKey => "4k",
            ManiaVariant::SevenKey => "7k",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserStatsVariant {
    pub user_id: u32,
    pub variant: ManiaVariant,
    pub ranked_score: i64,
    pub rank_counts: RankCounts,
}

impl UserStatsVariant {
    pub fn new(user_id: u32, variant: ManiaVariant) -> Self {
        Self {
            user_id,
            variant,
            ranked_score: 0,
            rank_counts: RankCounts::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DailyChallengeStats {
    pub user_id: u32,
    pub daily_streak_current: u32,
    pub daily_streak_best: u32,
}
