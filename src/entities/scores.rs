use crate::models::mods::ScoreMod;
use crate::models::performance::PerformanceSample;
use crate::models::process_history::ProcessHistory;
use crate::models::rulesets::Ruleset;
use crate::models::scores::{HitStatistics, Score, ScoreRank};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ScoreData {
    #[serde(default)]
    pub mods: Vec<ScoreMod>,
    #[serde(default)]
    pub statistics: HitStatistics,
    #[serde(default)]
    pub maximum_statistics: HitStatistics,
}

#[derive(Debug, FromRow)]
pub struct ScoreRow {
    pub id: u64,
    pub user_id: u32,
    pub ruleset_id: u16,
    pub beatmap_id: u32,
    pub preserve: bool,
    pub ranked: bool,
    pub rank: String,
    pub passed: bool,
    pub accuracy: f32,
    pub max_combo: u32,
    pub total_score: u32,
    pub data: Json<ScoreData>,
    #[sqlx(default)]
    pub pp: Option<f32>,
    #[sqlx(default)]
    pub legacy_score_id: Option<u64>,
    pub legacy_total_score: u32,
    #[sqlx(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: DateTime<Utc>,
}

impl TryFrom<ScoreRow> for Score {
    type Error = std::io::Error;

    fn try_from(row: ScoreRow) -> Result<Self, Self::Error> {
        let ScoreData {
            mods,
            statistics,
            maximum_statistics,
        } = row.data.0;
        Ok(Score {
            score_id: row.id,
            user_id: row.user_id,
            beatmap_id: row.beatmap_id,
            ruleset: Ruleset::try_from(row.ruleset_id as u8)?,
            passed: row.passed,
            preserve: row.preserve,
            ranked: row.ranked,
            legacy_score_id: row.legacy_score_id.filter(|id| *id != 0),
            legacy_total_score: row.legacy_total_score as u64,
            total_score: row.total_score as u64,
            accuracy: row.accuracy as f64,
            max_combo: row.max_combo,
            rank: ScoreRank::from_str(&row.rank)?,
            pp: row.pp.map(f64::from),
            mods,
            statistics,
            maximum_statistics,
            started_at: row.started_at,
            ended_at: row.ended_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct PerformanceSampleRow {
    pub beatmap_id: u32,
    pub pp: f32,
    pub accuracy: f32,
}

#[derive(Debug, FromRow)]
pub struct ProcessHistoryRow {
    pub score_id: u64,
    pub processed_version: u8,
    pub processed_at: DateTime<Utc>,
}

impl From<PerformanceSampleRow> for PerformanceSample {
    fn from(row: PerformanceSampleRow) -> Self {
        Self {
            beatmap_id: row.beatmap_id,
            pp: row.pp as f64,
            accuracy: row.accuracy as f64,
        }
    }
}

impl From<ProcessHistoryRow> for ProcessHistory {
    fn from(row: ProcessHistoryRow) -> Self {
        Self {
            score_id: row.score_id,
            processed_version: row.processed_version as u32,
            processed_at: row.processed_at,
        }
    }
}
