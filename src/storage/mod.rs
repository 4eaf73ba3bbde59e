//! Persistence seam of the processor. Every read and write the pipeline performs goes
//! through a [`StorageTransaction`] so that one score is applied atomically.

pub mod memory;
pub mod mysql;

use crate::models::beatmaps::{Beatmap, BeatmapPack};
use crate::models::medals::{MedalDefinition, MedalGrant};
use crate::models::performance::{PerformanceSample, PerformanceSampleFilter};
use crate::models::process_history::ProcessHistory;
use crate::models::rulesets::Ruleset;
use crate::models::scores::Score;
use crate::models::stats::{DailyChallengeStats, ManiaVariant, UserStats, UserStatsVariant};
use async_trait::async_trait;

/// Upper bound of scores considered for weighted performance.
pub const PERFORMANCE_SAMPLE_LIMIT: u32 = 1000;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn begin(&self) -> anyhow::Result<Box<dyn StorageTransaction>>;

    /// Idempotent, returns whether the grant did not exist yet.
    async fn grant_medal(&self, grant: &MedalGrant) -> anyhow::Result<bool>;

    /// Ids of scores whose marker is absent or older than `version`, ascending.
    async fn fetch_outdated_score_ids(
        &self,
        version: u32,
        after_score_id: u64,
        limit: u32,
    ) -> anyhow::Result<Vec<u64>>;
}

#[async_trait]
pub trait StorageTransaction: Send {
    async fn fetch_score(&mut self, score_id: u64) -> anyhow::Result<Option<Score>>;
    async fn fetch_process_history(&mut self, score_id: u64)
    -> anyhow::Result<Option<ProcessHistory>>;
    async fn save_process_history(&mut self, score_id: u64, version: u32) -> anyhow::Result<()>;

    async fn fetch_beatmap(&mut self, beatmap_id: u32) -> anyhow::Result<Option<Beatmap>>;
    async fn fetch_medal_definitions(&mut self) -> anyhow::Result<Vec<MedalDefinition>>;

    /// Locks the aggregate row until the transaction ends, creating it when absent.
    async fn fetch_user_stats_for_update(
        &mut self,
        user_id: u32,
        ruleset: Ruleset,
    ) -> anyhow::Result<UserStats>;
    async fn save_user_stats(&mut self, stats: &UserStats) -> anyhow::Result<()>;

    async fn fetch_variant_stats_for_update(
        &mut self,
        user_id: u32,
        variant: ManiaVariant,
    ) -> anyhow::Result<UserStatsVariant>;
    async fn save_variant_stats(&mut self, stats: &UserStatsVariant) -> anyhow::Result<()>;

    /// The `offset`-th best score of the reference's (user, beatmap, ruleset) group.
    async fn fetch_best_score(&mut self, reference: &Score, offset: u32)
    -> anyhow::Result<Option<Score>>;
    async fn update_score_performance(&mut self, score_id: u64, pp: Option<f64>)
    -> anyhow::Result<()>;
    async fn fetch_performance_samples(
        &mut self,
        user_id: u32,
        ruleset: Ruleset,
        filter: PerformanceSampleFilter,
    ) -> anyhow::Result<Vec<PerformanceSample>>;
    /// One based rank of `pp` among other users, and the number of ranked users including
    /// the given one.
    async fn fetch_performance_rank(
        &mut self,
        user_id: u32,
        ruleset: Ruleset,
        pp: f64,
    ) -> anyhow::Result<(u64, u64)>;

    async fn fetch_granted_medal_ids(&mut self, user_id: u32) -> anyhow::Result<Vec<u32>>;
    async fn is_user_restricted(&mut self, user_id: u32) -> anyhow::Result<bool>;
    async fn fetch_daily_challenge_stats(
        &mut self,
        user_id: u32,
    ) -> anyhow::Result<Option<DailyChallengeStats>>;
    async fn fetch_beatmap_pack_for_medal(
        &mut self,
        achievement_id: u32,
    ) -> anyhow::Result<Option<BeatmapPack>>;
    /// Distinct beatmapsets of the pack the user has passed, honouring the pack's rules.
    async fn count_completed_pack_sets(
        &mut self,
        user_id: u32,
        pack: &BeatmapPack,
    ) -> anyhow::Result<u32>;

    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}
