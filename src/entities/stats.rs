use crate::models::rulesets::Ruleset;
use crate::models::stats::{DailyChallengeStats, ManiaVariant, RankCounts, UserStats, UserStatsVariant};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct UserStatsRow {
    pub user_id: u32,
    pub playcount: i32,
    pub count300: i64,
    pub count100: i64,
    pub count50: i64,
    #[sqlx(rename = "countMiss")]
    pub count_miss: i64,
    pub total_score: i64,
    pub ranked_score: i64,
    pub level: f32,
    pub accuracy_new: f32,
    pub rank_score: f32,
    pub xh_rank_count: i32,
    pub x_rank_count: i32,
    pub sh_rank_count: i32,
    pub s_rank_count: i32,
    pub a_rank_count: i32,
    pub total_seconds_played: i64,
    #[sqlx(default)]
    pub last_played: Option<DateTime<Utc>>,
}

impl UserStatsRow {
    pub fn into_model(self, ruleset: Ruleset) -> UserStats {
        UserStats {
            user_id: self.user_id,
            ruleset,
            playcount: self.playcount,
            count_300: self.count300,
            count_100: self.count100,
            count_50: self.count50,
            count_miss: self.count_miss,
            total_score: self.total_score,
            ranked_score: self.ranked_score,
            level: self.level as f64,
            accuracy: self.accuracy_new as f64,
            pp: self.rank_score as f64,
            rank_counts: RankCounts {
                xh: self.xh_rank_count,
                x: self.x_rank_count,
                sh: self.sh_rank_count,
                s: self.s_rank_count,
                a: self.a_rank_count,
            },
            total_seconds_played: self.total_seconds_played,
            last_played: self.last_played,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct UserStatsVariantRow {
    pub user_id: u32,
    pub ranked_score: i64,
    pub xh_rank_count: i32,
    pub x_rank_count: i32,
    pub sh_rank_count: i32,
    pub s_rank_count: i32,
    pub a_rank_count: i32,
}

impl UserStatsVariantRow {
    pub fn into_model(self, variant: ManiaVariant) -> UserStatsVariant {
        UserStatsVariant {
            user_id: self.user_id,
            variant,
            ranked_score: self.ranked_score,
            rank_counts: RankCounts {
                xh: self.xh_rank_count,
                x: self.x_rank_count,
                sh: self.sh_rank_count,
                s: self.s_rank_count,
                a: self.a_rank_count,
            },
        }
    }
}

#[derive(Debug, FromRow)]
pub struct DailyChallengeStatsRow {
    pub user_id: u32,
    pub daily_streak_current: u32,
    pub daily_streak_best: u32,
}

impl From<DailyChallengeStatsRow> for DailyChallengeStats {
    fn from(row: DailyChallengeStatsRow) -> Self {
        Self {
            user_id: row.user_id,
            daily_streak_current: row.daily_streak_current,
            daily_streak_best: row.daily_streak_best,
        }
    }
}
