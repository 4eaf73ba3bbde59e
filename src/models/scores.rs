use crate::models::mods::{self, ScoreMod};
use crate::models::rulesets::Ruleset;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitStatistics {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub ok: u32,
    pub meh: u32,
    pub miss: u32,
    pub large_tick_hit: u32,
    pub large_tick_miss: u32,
    pub small_tick_hit: u32,
    pub small_tick_miss: u32,
    pub slider_tail_hit: u32,
    pub large_bonus: u32,
    pub small_bonus: u32,
    pub ignore_hit: u32,
    pub ignore_miss: u32,
}

impl HitStatistics {
    /// Judgements that make up the base accuracy of a play.
    pub const fn basic_judgements(&self) -> u32 {
        self.perfect + self.great + self.good + self.ok + self.meh + self.miss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreRank {
    F,
    D,
    C,
    B,
    A,
    S,
    SH,
    X,
    XH,
}

impl ScoreRank {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScoreRank::F => "F",
            ScoreRank::D => "D",
            ScoreRank::C => "C",
            ScoreRank::B => "B",
            ScoreRank::A => "A",
            ScoreRank::S => "S",
            ScoreRank::SH => "SH",
            ScoreRank::X => "X",
            ScoreRank::XH => "XH",
        }
    }
}

impl FromStr for ScoreRank {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use std::io::{Error, ErrorKind};

        match s {
            "F" => Ok(ScoreRank::F),
            "D" => Ok(ScoreRank::D),
            "C" => Ok(ScoreRank::C),
            "B" => Ok(ScoreRank::B),
            "A" => Ok(ScoreRank::A),
            "S" => Ok(ScoreRank::S),
            "SH" => Ok(ScoreRank::SH),
            "X" => Ok(ScoreRank::X),
            "XH" => Ok(ScoreRank::XH),
            _ => Err(Error::new(ErrorKind::InvalidData, "invalid score rank")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub score_id: u64,
    pub user_id: u32,
    pub beatmap_id: u32,
    pub ruleset: Ruleset,
    pub passed: bool,
    pub preserve: bool,
    pub ranked: bool,
    pub legacy_score_id: Option<u64>,
    pub legacy_total_score: u64,
    pub total_score: u64,
    pub accuracy: f64,
    pub max_combo: u32,
    pub rank: ScoreRank,
    pub pp: Option<f64>,
    pub mods: Vec<ScoreMod>,
    pub statistics: HitStatistics,
    pub maximum_statistics: HitStatistics,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: DateTime<Utc>,
}

impl Score {
    pub const fn is_legacy(&self) -> bool {
        self.legacy_score_id.is_some()
    }

    pub fn has_difficulty_reduction(&self) -> bool {
        mods::has_difficulty_reduction(&self.mods)
    }

    pub const fn is_full_combo(&self) -> bool {
        self.passed && self.statistics.miss == 0 && self.statistics.large_tick_miss == 0
    }

    /// Total score as displayed under classic scoring.
    pub fn classic_total_score(&self) -> i64 {
        if self.is_legacy() {
            return self.legacy_total_score as i64;
        }

        let Some(multiplier) = self.ruleset.classic_multiplier() else {
            return self.total_score as i64;
        };
        let objects = self.maximum_statistics.basic_judgements() as f64;
        let classic = (objects * objects * multiplier + 100_000.0) * self.total_score as f64
            / 1_000_000.0;
        classic.round() as i64
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub fn sample_score(score_id: u64, total_score: u64, rank: ScoreRank) -> Score {
        Score {
            score_id,
            user_id: 2,
            beatmap_id: 100,
            ruleset: Ruleset::Osu,
            passed: true,
            preserve: true,
            ranked: true,
            legacy_score_id: None,
            legacy_total_score: 0,
            total_score,
            accuracy: 0.98,
            max_combo: 500,
            rank,
            pp: None,
            mods: vec![],
            statistics: HitStatistics {
                great: 5,
                ..Default::default()
            },
            maximum_statistics: HitStatistics {
                great: 5,
                ..Default::default()
            },
            started_at: None,
            ended_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn mania_classic_score_is_standardised() {
        let mut score = sample_score(1, 800_000, ScoreRank::A);
        score.ruleset = Ruleset::Mania;
        assert_eq!(score.classic_total_score(), 800_000);
    }

    #[test]
    fn osu_classic_score_scales_with_object_count() {
        let mut score = sample_score(1, 1_000_000, ScoreRank::X);
        score.maximum_statistics.great = 100;
        // (100^2 * 32.57 + 100000) * 1
        assert_eq!(score.classic_total_score(), 425_700);
    }

    #[test]
    fn legacy_scores_keep_their_original_total() {
        let mut score = sample_score(1, 1_000_000, ScoreRank::X);
        score.legacy_score_id = Some(55);
        score.legacy_total_score = 12_345_678;
        assert_eq!(score.classic_total_score(), 12_345_678);
    }

    #[test]
    fn parses_ranks() {
        assert_eq!(ScoreRank::from_str("SH").unwrap(), ScoreRank::SH);
        assert!(ScoreRank::from_str("Z").is_err());
    }
}
