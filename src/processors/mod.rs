//! Stat processors and the pipeline running them. Each processor owns one slice of a
//! user's aggregate and knows how to add and remove a single score's contribution.

pub mod hit_statistics;
pub mod level;
pub mod mania_key_modes;
pub mod medals;
pub mod play_count;
pub mod play_time;
pub mod rank_counts;
pub mod ranked_score;
pub mod score_performance;
pub mod total_score;
pub mod user_total_performance;
pub mod versioning;

use crate::common::error::ServiceResult;
use crate::models::beatmaps::Beatmap;
use crate::models::notifications::PostCommitAction;
use crate::models::scores::Score;
use crate::models::stats::UserStats;
use crate::storage::StorageTransaction;
use crate::usecases::beatmaps::BeatmapLookup;
use crate::usecases::medals::MedalDefinitionCache;
use async_trait::async_trait;
use std::sync::Arc;

/// Version written to the processing marker. Bump whenever a processor changes behaviour.
pub const CURRENT_VERSION: u32 = 7;

pub const ORDER_DEFAULT: i32 = 0;
pub const ORDER_USER_PERFORMANCE: i32 = 1;
pub const ORDER_MEDALS: i32 = i32::MAX;

pub struct ProcessContext<'a> {
    pub score: &'a Score,
    pub beatmap: &'a Beatmap,
    pub stats: &'a mut UserStats,
    /// Pipeline version the score is applied under.
    pub version: u32,
    pub tx: &'a mut dyn StorageTransaction,
    pub beatmaps: &'a BeatmapLookup,
    pub actions: &'a mut Vec<PostCommitAction>,
}

#[async_trait]
pub trait StatProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn order(&self) -> i32 {
        ORDER_DEFAULT
    }

    fn runs_on_failed_scores(&self) -> bool;
    fn runs_on_legacy_scores(&self) -> bool;

    async fn apply(&self, ctx: &mut ProcessContext<'_>) -> ServiceResult<()>;

    /// Removes the contribution made when the score was applied under `previous_version`.
    async fn revert(&self, ctx: &mut ProcessContext<'_>, previous_version: u32)
    -> ServiceResult<()>;
}

pub struct StatisticsPipeline {
    processors: Vec<Box<dyn StatProcessor>>,
    version: u32,
}

impl StatisticsPipeline {
    pub fn new(medal_definitions: Arc<MedalDefinitionCache>) -> Self {
        let processors: Vec<Box<dyn StatProcessor>> = vec![
            Box::new(play_count::PlayCountProcessor),
            Box::new(hit_statistics::HitStatisticsProcessor),
            Box::new(total_score::TotalScoreProcessor),
            Box::new(play_time::PlayTimeProcessor),
            Box::new(ranked_score::RankedScoreProcessor),
            Box::new(rank_counts::RankCountsProcessor),
            Box::new(mania_key_modes::ManiaKeyModesProcessor),
            Box::new(score_performance::ScorePerformanceProcessor),
            Box::new(user_total_performance::UserTotalPerformanceProcessor),
            Box::new(medals::MedalProcessor::new(medal_definitions)),
        ];
        Self::from_processors(processors)
    }

    pub fn from_processors(mut processors: Vec<Box<dyn StatProcessor>>) -> Self {
        processors.sort_by_key(|processor| processor.order());
        Self {
            processors,
            version: CURRENT_VERSION,
        }
    }

    /// Runs the pipeline as it behaved at an earlier version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub const fn version(&self) -> u32 {
        self.version
    }

    pub fn processor_names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    fn runs_on(processor: &dyn StatProcessor, score: &Score) -> bool {
        (score.passed || processor.runs_on_failed_scores())
            && (!score.is_legacy() || processor.runs_on_legacy_scores())
    }

    pub async fn apply(&self, ctx: &mut ProcessContext<'_>) -> ServiceResult<()> {
        for processor in &self.processors {
            if Self::runs_on(processor.as_ref(), ctx.score) {
                processor.apply(ctx).await?;
            }
        }
        Ok(())
    }

    pub async fn revert(
        &self,
        ctx: &mut ProcessContext<'_>,
        previous_version: u32,
    ) -> ServiceResult<()> {
        for processor in self.processors.iter().rev() {
            if Self::runs_on(processor.as_ref(), ctx.score) {
                processor.revert(ctx, previous_version).await?;
            }
        }
        Ok(())
    }
}
