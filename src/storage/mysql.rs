use crate::models::beatmaps::{Beatmap, BeatmapPack};
use crate::models::medals::{MedalDefinition, MedalGrant};
use crate::models::performance::{PerformanceSample, PerformanceSampleFilter};
use crate::models::process_history::ProcessHistory;
use crate::models::rulesets::Ruleset;
use crate::models::scores::Score;
use crate::models::stats::{DailyChallengeStats, ManiaVariant, UserStats, UserStatsVariant};
use crate::repositories::{beatmaps, medals, process_history, scores, stats, users};
use crate::storage::{PERFORMANCE_SAMPLE_LIMIT, Storage, StorageTransaction};
use async_trait::async_trait;
use sqlx::{MySql, Pool, Transaction};

#[derive(Clone)]
pub struct MySqlStorage {
    db: Pool<MySql>,
}

impl MySqlStorage {
    pub fn new(db: Pool<MySql>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Storage for MySqlStorage {
    async fn begin(&self) -> anyhow::Result<Box<dyn StorageTransaction>> {
        let tx = self.db.begin().await?;
        Ok(Box::new(MySqlStorageTransaction { tx }))
    }

    async fn grant_medal(&self, grant: &MedalGrant) -> anyhow::Result<bool> {
        Ok(medals::insert_grant(&self.db, grant).await?)
    }

    async fn fetch_outdated_score_ids(
        &self,
        version: u32,
        after_score_id: u64,
        limit: u32,
    ) -> anyhow::Result<Vec<u64>> {
        let ids =
            process_history::fetch_outdated_score_ids(&self.db, version, after_score_id, limit)
                .await?;
        Ok(ids)
    }
}

pub struct MySqlStorageTransaction {
    tx: Transaction<'static, MySql>,
}

#[async_trait]
impl StorageTransaction for MySqlStorageTransaction {
    async fn fetch_score(&mut self, score_id: u64) -> anyhow::Result<Option<Score>> {
        let score = scores::fetch_one(&mut *self.tx, score_id).await?;
        Ok(score.map(Score::try_from).transpose()?)
    }

    async fn fetch_process_history(
        &mut self,
        score_id: u64,
    ) -> anyhow::Result<Option<ProcessHistory>> {
        let history = process_history::fetch_one(&mut *self.tx, score_id).await?;
        Ok(history.map(ProcessHistory::from))
    }

    async fn save_process_history(&mut self, score_id: u64, version: u32) -> anyhow::Result<()> {
        Ok(process_history::upsert(&mut *self.tx, score_id, version).await?)
    }

    async fn fetch_beatmap(&mut self, beatmap_id: u32) -> anyhow::Result<Option<Beatmap>> {
        let beatmap = beatmaps::fetch_by_id(&mut *self.tx, beatmap_id).await?;
        Ok(beatmap.map(Beatmap::try_from).transpose()?)
    }

    async fn fetch_medal_definitions(&mut self) -> anyhow::Result<Vec<MedalDefinition>> {
        let rows = medals::fetch_all(&mut *self.tx).await?;
        let definitions = rows
            .into_iter()
            .map(MedalDefinition::try_from)
            .collect::<Result<_, _>>()?;
        Ok(definitions)
    }

    async fn fetch_user_stats_for_update(
        &mut self,
        user_id: u32,
        ruleset: Ruleset,
    ) -> anyhow::Result<UserStats> {
        let row = stats::fetch_for_update(&mut self.tx, user_id, ruleset).await?;
        Ok(row.into_model(ruleset))
    }

    async fn save_user_stats(&mut self, user_stats: &UserStats) -> anyhow::Result<()> {
        Ok(stats::update(&mut *self.tx, user_stats).await?)
    }

    async fn fetch_variant_stats_for_update(
        &mut self,
        user_id: u32,
        variant: ManiaVariant,
    ) -> anyhow::Result<UserStatsVariant> {
        let row = stats::fetch_variant_for_update(&mut self.tx, user_id, variant).await?;
        Ok(row.into_model(variant))
    }

    async fn save_variant_stats(&mut self, variant_stats: &UserStatsVariant) -> anyhow::Result<()> {
        Ok(stats::update_variant(&mut *self.tx, variant_stats).await?)
    }

    async fn fetch_best_score(
        &mut self,
        reference: &Score,
        offset: u32,
    ) -> anyhow::Result<Option<Score>> {
        let score = scores::fetch_best(&mut *self.tx, reference, offset).await?;
        Ok(score.map(Score::try_from).transpose()?)
    }

    async fn update_score_performance(
        &mut self,
        score_id: u64,
        pp: Option<f64>,
    ) -> anyhow::Result<()> {
        Ok(scores::update_performance(&mut *self.tx, score_id, pp).await?)
    }

    async fn fetch_performance_samples(
        &mut self,
        user_id: u32,
        ruleset: Ruleset,
        filter: PerformanceSampleFilter,
    ) -> anyhow::Result<Vec<PerformanceSample>> {
        let rows = scores::fetch_performance_samples(
            &mut *self.tx,
            user_id,
            ruleset,
            filter.include_score_id,
            filter.exclude_score_id,
            PERFORMANCE_SAMPLE_LIMIT,
        )
        .await?;
        Ok(rows.into_iter().map(PerformanceSample::from).collect())
    }

    async fn fetch_performance_rank(
        &mut self,
        user_id: u32,
        ruleset: Ruleset,
        pp: f64,
    ) -> anyhow::Result<(u64, u64)> {
        Ok(stats::fetch_performance_rank(&mut self.tx, user_id, ruleset, pp).await?)
    }

    async fn fetch_granted_medal_ids(&mut self, user_id: u32) -> anyhow::Result<Vec<u32>> {
        Ok(medals::fetch_granted_ids(&mut *self.tx, user_id).await?)
    }

    async fn is_user_restricted(&mut self, user_id: u32) -> anyhow::Result<bool> {
        Ok(users::is_restricted(&mut *self.tx, user_id).await?)
    }

    async fn fetch_daily_challenge_stats(
        &mut self,
        user_id: u32,
    ) -> anyhow::Result<Option<DailyChallengeStats>> {
        let row = stats::fetch_daily_challenge(&mut *self.tx, user_id).await?;
        Ok(row.map(DailyChallengeStats::from))
    }

    async fn fetch_beatmap_pack_for_medal(
        &mut self,
        achievement_id: u32,
    ) -> anyhow::Result<Option<BeatmapPack>> {
        match beatmaps::fetch_pack_by_achievement(&mut self.tx, achievement_id).await? {
            Some((pack, beatmapset_ids)) => Ok(Some(pack.into_model(beatmapset_ids)?)),
            None => Ok(None),
        }
    }

    async fn count_completed_pack_sets(
        &mut self,
        user_id: u32,
        pack: &BeatmapPack,
    ) -> anyhow::Result<u32> {
        let count = scores::count_completed_pack_sets(&mut self.tx, user_id, pack).await?;
        Ok(count as u32)
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        Ok(self.tx.commit().await?)
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(self.tx.rollback().await?)
    }
}
