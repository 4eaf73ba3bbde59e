#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use score_statistics_processor::adapters::notifications::MemoryNotifier;
use score_statistics_processor::common::error::ServiceResult;
use score_statistics_processor::models::beatmaps::{Beatmap, DifficultyAttributes, RankedStatus};
use score_statistics_processor::models::medals::MedalDefinition;
use score_statistics_processor::models::mods::ScoreMod;
use score_statistics_processor::models::queue::{ProcessOutcome, ScoreItem};
use score_statistics_processor::models::rulesets::Ruleset;
use score_statistics_processor::models::scores::{HitStatistics, Score, ScoreRank};
use score_statistics_processor::models::stats::{ManiaVariant, UserStats, UserStatsVariant};
use score_statistics_processor::processors::{CURRENT_VERSION, StatisticsPipeline};
use score_statistics_processor::storage::memory::MemoryStorage;
use score_statistics_processor::usecases::beatmaps::{BeatmapLookup, DifficultyCalculator};
use score_statistics_processor::usecases::medals::MedalDefinitionCache;
use score_statistics_processor::usecases::score_statistics::ScoreStatisticsProcessor;
use std::sync::Arc;
use std::time::Duration;

pub const USER_ID: u32 = 2;
pub const BEATMAP_ID: u32 = 100;
pub const BEATMAPSET_ID: u32 = 10;
pub const MANIA_BEATMAP_ID: u32 = 300;

/// Rates every beatmap at five stars and pays one pp per 10k score.
pub struct FixedCalculator;

#[async_trait]
impl DifficultyCalculator for FixedCalculator {
    async fn compute_attributes(
        &self,
        beatmap: &Beatmap,
        _ruleset: Ruleset,
        _mods: &[ScoreMod],
    ) -> ServiceResult<Option<DifficultyAttributes>> {
        Ok(Some(DifficultyAttributes {
            star_rating: 5.0,
            max_combo: beatmap.max_combo.unwrap_or_default(),
        }))
    }

    async fn compute_performance(
        &self,
        score: &Score,
        _beatmap: &Beatmap,
        _attributes: &DifficultyAttributes,
    ) -> ServiceResult<f64> {
        Ok(score.total_score as f64 / 10_000.0)
    }
}

pub fn beatmap(beatmap_id: u32, beatmapset_id: u32) -> Beatmap {
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

pub fn score(score_id: u64, total_score: u64, rank: ScoreRank) -> Score {
    let hits = HitStatistics {
        great: 5,
        ..Default::default()
    };
    Score {
        score_id,
        user_id: USER_ID,
        beatmap_id: BEATMAP_ID,
        ruleset: Ruleset::Osu,
        passed: true,
        preserve: true,
        ranked: true,
        legacy_score_id: None,
        legacy_total_score: 0,
        total_score,
        accuracy: 0.98,
        max_combo: 5,
        rank,
        pp: None,
        mods: vec![],
        statistics: hits,
        maximum_statistics: hits,
        started_at: None,
        ended_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + chrono::TimeDelta::seconds(score_id as i64),
    }
}

/// A 4K mania beatmap in its own set.
pub fn mania_beatmap() -> Beatmap {
    Beatmap {
        ruleset: Ruleset::Mania,
        diff_size: 4.0,
        ..beatmap(MANIA_BEATMAP_ID, 30)
    }
}

pub fn mania_score(score_id: u64, total_score: u64, rank: ScoreRank) -> Score {
    Score {
        beatmap_id: MANIA_BEATMAP_ID,
        ruleset: Ruleset::Mania,
        ..score(score_id, total_score, rank)
    }
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

pub struct Harness {
    pub storage: MemoryStorage,
    pub notifier: Arc<MemoryNotifier>,
    pub processor: ScoreStatisticsProcessor,
}

impl Harness {
    pub async fn new() -> Self {
        Self::at_version(CURRENT_VERSION).await
    }

    pub async fn at_version(version: u32) -> Self {
        let storage = MemoryStorage::new();
        storage.insert_beatmap(beatmap(BEATMAP_ID, BEATMAPSET_ID)).await;
        storage.insert_beatmap(mania_beatmap()).await;
        let notifier = Arc::new(MemoryNotifier::new());
        let processor = processor_for(&storage, notifier.clone(), version);
        Self {
            storage,
            notifier,
            processor,
        }
    }

    /// Same store, different pipeline version.
    pub fn upgrade_to(&mut self, version: u32) {
        self.processor = processor_for(&self.storage, self.notifier.clone(), version);
    }

    pub async fn submit(&self, score: Score) -> ProcessOutcome {
        let score_id = score.score_id;
        self.storage.insert_score(score).await;
        self.process(score_id).await
    }

    pub async fn process(&self, score_id: u64) -> ProcessOutcome {
        self.processor
            .process(&ScoreItem::new(score_id))
            .await
            .expect("score should process")
    }

    pub async fn reprocess(&self, score_id: u64) -> ProcessOutcome {
        self.processor
            .process(&ScoreItem::forced(score_id))
            .await
            .expect("score should reprocess")
    }

    pub async fn stats(&self) -> UserStats {
        self.stats_for(Ruleset::Osu).await
    }

    pub async fn stats_for(&self, ruleset: Ruleset) -> UserStats {
        self.storage
            .user_stats(USER_ID, ruleset)
            .await
            .expect("aggregate row should exist")
    }

    pub async fn variant_stats(&self, variant: ManiaVariant) -> UserStatsVariant {
        self.storage
            .variant_stats(USER_ID, variant)
            .await
            .expect("variant row should exist")
    }
}

pub fn processor_for(
    storage: &MemoryStorage,
    notifier: Arc<MemoryNotifier>,
    version: u32,
) -> ScoreStatisticsProcessor {
    let beatmaps = Arc::new(BeatmapLookup::new(
        Arc::new(FixedCalculator),
        64,
        Duration::from_secs(60),
    ));
    let pipeline =
        StatisticsPipeline::new(Arc::new(MedalDefinitionCache::new())).with_version(version);
    ScoreStatisticsProcessor::new(Arc::new(storage.clone()), pipeline, beatmaps, notifier)
}
