use crate::common::error::{AppError, ServiceResult};
use crate::models::beatmaps::{Beatmap, DifficultyAttributes};
use crate::models::mods::ScoreMod;
use crate::models::rulesets::Ruleset;
use crate::models::scores::Score;
use crate::usecases::beatmaps::DifficultyCalculator;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::warn;

static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

#[derive(Serialize)]
struct DifficultyRequest<'a> {
    beatmap_id: u32,
    mode: u8,
    mods: &'a [ScoreMod],
}

#[derive(Deserialize)]
struct DifficultyResponse {
    stars: f64,
    max_combo: u32,
}

#[derive(Serialize)]
struct PerformanceRequest<'a> {
    beatmap_id: u32,
    mode: u8,
    mods: &'a [ScoreMod],
    max_combo: u32,
    accuracy: f64,
    miss_count: u32,
    passed: bool,
    star_rating: f64,
}

#[derive(Deserialize)]
struct PerformanceResponse {
    pp: f64,
}

/// Calls the performance service over HTTP.
pub struct PerformanceServiceClient {
    base_url: String,
}

impl PerformanceServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn make_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl DifficultyCalculator for PerformanceServiceClient {
    async fn compute_attributes(
        &self,
        beatmap: &Beatmap,
        ruleset: Ruleset,
        mods: &[ScoreMod],
    ) -> ServiceResult<Option<DifficultyAttributes>> {
        let url = self.make_url("/api/v1/difficulty");
        let request = DifficultyRequest {
            beatmap_id: beatmap.beatmap_id,
            mode: ruleset.into(),
            mods,
        };
        let response = CLIENT.post(url).json(&request).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => return Ok(None),
            status if !status.is_success() => {
                warn!(
                    beatmap_id = beatmap.beatmap_id,
                    status = status.as_u16(),
                    "Difficulty calculation failed"
                );
                return Err(AppError::DifficultyAttributesNotFound);
            }
            _ => {}
        }

        let attributes: DifficultyResponse = response.json().await?;
        Ok(Some(DifficultyAttributes {
            star_rating: attributes.stars,
            max_combo: attributes.max_combo,
        }))
    }

    async fn compute_performance(
        &self,
        score: &Score,
        beatmap: &Beatmap,
        attributes: &DifficultyAttributes,
    ) -> ServiceResult<f64> {
        let url = self.make_url("/api/v1/calculate");
        let request = PerformanceRequest {
            beatmap_id: beatmap.beatmap_id,
            mode: score.ruleset.into(),
            mods: &score.mods,
            max_combo: score.max_combo,
            accuracy: score.accuracy * 100.0,
            miss_count: score.statistics.miss,
            passed: score.passed,
            star_rating: attributes.star_rating,
        };
        let response = CLIENT.post(url).json(&[request]).send().await?;
        if !response.status().is_success() {
            warn!(
                score_id = score.score_id,
                status = response.status().as_u16(),
                "Performance calculation failed"
            );
            return Err(AppError::PerformanceCalculationFailed);
        }

        let results: Vec<PerformanceResponse> = response.json().await?;
        match results.first() {
            Some(result) if result.pp.is_finite() => Ok(result.pp),
            _ => Err(AppError::PerformanceCalculationFailed),
        }
    }
}
