//! In-process [`Storage`] used by tests and local runs. A transaction holds the store's
//! lock for its whole lifetime and works on a copy that replaces the store on commit.

use crate::models::beatmaps::{Beatmap, BeatmapPack};
use crate::models::medals::{MedalDefinition, MedalGrant};
use crate::models::performance::{PerformanceSample, PerformanceSampleFilter};
use crate::models::process_history::ProcessHistory;
use crate::models::rulesets::Ruleset;
use crate::models::scores::Score;
use crate::models::stats::{DailyChallengeStats, ManiaVariant, UserStats, UserStatsVariant};
use crate::storage::{PERFORMANCE_SAMPLE_LIMIT, Storage, StorageTransaction};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default, Clone)]
struct MemoryState {
    scores: BTreeMap<u64, Score>,
    beatmaps: HashMap<u32, Beatmap>,
    process_history: HashMap<u64, ProcessHistory>,
    user_stats: HashMap<(u32, Ruleset), UserStats>,
    variant_stats: HashMap<(u32, ManiaVariant), UserStatsVariant>,
    medals: Vec<MedalDefinition>,
    grants: BTreeMap<(u32, u32), MedalGrant>,
    packs: Vec<BeatmapPack>,
    restricted_users: HashSet<u32>,
    daily_challenge: HashMap<u32, DailyChallengeStats>,
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_score(&self, score: Score) {
        self.state.lock().await.scores.insert(score.score_id, score);
    }

    pub async fn insert_beatmap(&self, beatmap: Beatmap) {
        let mut state = self.state.lock().await;
        state.beatmaps.insert(beatmap.beatmap_id, beatmap);
    }

    pub async fn insert_medal(&self, medal: MedalDefinition) {
        self.state.lock().await.medals.push(medal);
    }

    pub async fn insert_pack(&self, pack: BeatmapPack) {
        self.state.lock().await.packs.push(pack);
    }

    pub async fn restrict_user(&self, user_id: u32) {
        self.state.lock().await.restricted_users.insert(user_id);
    }

    pub async fn set_daily_challenge(&self, stats: DailyChallengeStats) {
        let mut state = self.state.lock().await;
        state.daily_challenge.insert(stats.user_id, stats);
    }

    pub async fn set_process_history(&self, score_id: u64, version: u32) {
        let history = ProcessHistory {
            score_id,
            processed_version: version,
            processed_at: Utc::now(),
        };
        let mut state = self.state.lock().await;
        state.process_history.insert(score_id, history);
    }

    pub async fn score(&self, score_id: u64) -> Option<Score> {
        self.state.lock().await.scores.get(&score_id).cloned()
    }

    pub async fn user_stats(&self, user_id: u32, ruleset: Ruleset) -> Option<UserStats> {
        let state = self.state.lock().await;
        state.user_stats.get(&(user_id, ruleset)).cloned()
    }

    pub async fn variant_stats(&self, user_id: u32, variant: ManiaVariant) -> Option<UserStatsVariant> {
        let state = self.state.lock().await;
        state.variant_stats.get(&(user_id, variant)).cloned()
    }

    pub async fn process_history(&self, score_id: u64) -> Option<ProcessHistory> {
        let state = self.state.lock().await;
        state.process_history.get(&score_id).cloned()
    }

    pub async fn grants(&self, user_id: u32) -> Vec<MedalGrant> {
        let state = self.state.lock().await;
        state
            .grants
            .values()
            .filter(|grant| grant.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn begin(&self) -> anyhow::Result<Box<dyn StorageTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryStorageTransaction { guard, working }))
    }

    async fn grant_medal(&self, grant: &MedalGrant) -> anyhow::Result<bool> {
        let mut state = self.state.lock().await;
        let key = (grant.user_id, grant.achievement_id);
        if state.grants.contains_key(&key) {
            return Ok(false);
        }
        state.grants.insert(key, grant.clone());
        Ok(true)
    }

    async fn fetch_outdated_score_ids(
        &self,
        version: u32,
        after_score_id: u64,
        limit: u32,
    ) -> anyhow::Result<Vec<u64>> {
        let state = self.state.lock().await;
        let ids = state
            .scores
            .range(after_score_id + 1..)
            .map(|(score_id, _)| *score_id)
            .filter(|score_id| {
                state
                    .process_history
                    .get(score_id)
                    .is_none_or(|history| history.processed_version < version)
            })
            .take(limit as usize)
            .collect();
        Ok(ids)
    }
}

pub struct MemoryStorageTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

impl MemoryStorageTransaction {
    fn is_ranked_beatmap(&self, beatmap_id: u32) -> bool {
        self.working
            .beatmaps
            .get(&beatmap_id)
            .is_some_and(|beatmap| beatmap.ranked_status.is_ranked())
    }
}

#[async_trait]
impl StorageTransaction for MemoryStorageTransaction {
    async fn fetch_score(&mut self, score_id: u64) -> anyhow::Result<Option<Score>> {
        Ok(self.working.scores.get(&score_id).cloned())
    }

    async fn fetch_process_history(
        &mut self,
        score_id: u64,
    ) -> anyhow::Result<Option<ProcessHistory>> {
        Ok(self.working.process_history.get(&score_id).cloned())
    }

    async fn save_process_history(&mut self, score_id: u64, version: u32) -> anyhow::Result<()> {
        let history = ProcessHistory {
            score_id,
            processed_version: version,
            processed_at: Utc::now(),
        };
        self.working.process_history.insert(score_id, history);
        Ok(())
    }

    async fn fetch_beatmap(&mut self, beatmap_id: u32) -> anyhow::Result<Option<Beatmap>> {
        Ok(self.working.beatmaps.get(&beatmap_id).cloned())
    }

    async fn fetch_medal_definitions(&mut self) -> anyhow::Result<Vec<MedalDefinition>> {
        Ok(self.working.medals.clone())
    }

    async fn fetch_user_stats_for_update(
        &mut self,
        user_id: u32,
        ruleset: Ruleset,
    ) -> anyhow::Result<UserStats> {
        let stats = self
            .working
            .user_stats
            .entry((user_id, ruleset))
            .or_insert_with(|| UserStats::new(user_id, ruleset));
        Ok(stats.clone())
    }

    async fn save_user_stats(&mut self, stats: &UserStats) -> anyhow::Result<()> {
        let key = (stats.user_id, stats.ruleset);
        self.working.user_stats.insert(key, stats.clone());
        Ok(())
    }

    async fn fetch_variant_stats_for_update(
        &mut self,
        user_id: u32,
        variant: ManiaVariant,
    ) -> anyhow::Result<UserStatsVariant> {
        let stats = self
            .working
            .variant_stats
            .entry((user_id, variant))
            .or_insert_with(|| UserStatsVariant::new(user_id, variant));
        Ok(stats.clone())
    }

    async fn save_variant_stats(&mut self, stats: &UserStatsVariant) -> anyhow::Result<()> {
        let key = (stats.user_id, stats.variant);
        self.working.variant_stats.insert(key, stats.clone());
        Ok(())
    }

    async fn fetch_best_score(
        &mut self,
        reference: &Score,
        offset: u32,
    ) -> anyhow::Result<Option<Score>> {
        let counted = |score: &Score| {
            score.preserve && self.working.process_history.contains_key(&score.score_id)
        };
        let mut group: Vec<&Score> = self
            .working
            .scores
            .values()
            .filter(|score| {
                score.user_id == reference.user_id
                    && score.beatmap_id == reference.beatmap_id
                    && score.ruleset == reference.ruleset
                    && score.ranked
                    && (score.score_id == reference.score_id || counted(score))
            })
            .collect();
        group.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then(b.score_id.cmp(&a.score_id))
        });
        Ok(group.get(offset as usize).map(|score| (*score).clone()))
    }

    async fn update_score_performance(
        &mut self,
        score_id: u64,
        pp: Option<f64>,
    ) -> anyhow::Result<()> {
        if let Some(score) = self.working.scores.get_mut(&score_id) {
            score.pp = pp;
        }
        Ok(())
    }

    async fn fetch_performance_samples(
        &mut self,
        user_id: u32,
        ruleset: Ruleset,
        filter: PerformanceSampleFilter,
    ) -> anyhow::Result<Vec<PerformanceSample>> {
        let mut best: HashMap<u32, (&Score, f64)> = HashMap::new();
        for score in self.working.scores.values() {
            if score.user_id != user_id
                || score.ruleset != ruleset
                || !score.ranked
                || !(score.preserve || filter.include_score_id == Some(score.score_id))
                || filter.exclude_score_id == Some(score.score_id)
                || !self.is_ranked_beatmap(score.beatmap_id)
            {
                continue;
            }
            let Some(pp) = score.pp else {
                continue;
            };

            let replace = match best.get(&score.beatmap_id) {
                Some((current, current_pp)) => {
                    pp > *current_pp || (pp == *current_pp && score.score_id > current.score_id)
                }
                None => true,
            };
            if replace {
                best.insert(score.beatmap_id, (score, pp));
            }
        }

        let mut samples: Vec<PerformanceSample> = best
            .into_values()
            .map(|(score, pp)| PerformanceSample {
                beatmap_id: score.beatmap_id,
                pp,
                accuracy: score.accuracy,
            })
            .collect();
        samples.sort_by(|a, b| b.pp.total_cmp(&a.pp).then(a.beatmap_id.cmp(&b.beatmap_id)));
        samples.truncate(PERFORMANCE_SAMPLE_LIMIT as usize);
        Ok(samples)
    }

    async fn fetch_performance_rank(
        &mut self,
        user_id: u32,
        ruleset: Ruleset,
        pp: f64,
    ) -> anyhow::Result<(u64, u64)> {
        let others = self
            .working
            .user_stats
            .values()
            .filter(|stats| stats.ruleset == ruleset && stats.user_id != user_id);
        let (mut above, mut ranked) = (0, 0);
        for stats in others {
            if stats.pp > 0.0 {
                ranked += 1;
            }
            if stats.pp > pp {
                above += 1;
            }
        }
        Ok((above + 1, ranked + 1))
    }

    async fn fetch_granted_medal_ids(&mut self, user_id: u32) -> anyhow::Result<Vec<u32>> {
        let granted = self
            .working
            .grants
            .keys()
            .filter(|(grant_user_id, _)| *grant_user_id == user_id)
            .map(|(_, achievement_id)| *achievement_id)
            .collect();
        Ok(granted)
    }

    async fn is_user_restricted(&mut self, user_id: u32) -> anyhow::Result<bool> {
        Ok(self.working.restricted_users.contains(&user_id))
    }

    async fn fetch_daily_challenge_stats(
        &mut self,
        user_id: u32,
    ) -> anyhow::Result<Option<DailyChallengeStats>> {
        Ok(self.working.daily_challenge.get(&user_id).copied())
    }

    async fn fetch_beatmap_pack_for_medal(
        &mut self,
        achievement_id: u32,
    ) -> anyhow::Result<Option<BeatmapPack>> {
        let pack = self
            .working
            .packs
            .iter()
            .find(|pack| pack.achievement_id == Some(achievement_id))
            .cloned();
        Ok(pack)
    }

    async fn count_completed_pack_sets(
        &mut self,
        user_id: u32,
        pack: &BeatmapPack,
    ) -> anyhow::Result<u32> {
        let completed: HashSet<u32> = self
            .working
            .scores
            .values()
            .filter(|score| score.user_id == user_id && score.passed)
            .filter(|score| pack.ruleset.is_none_or(|ruleset| ruleset == score.ruleset))
            .filter(|score| !(pack.no_diff_reduction && score.has_difficulty_reduction()))
            .filter_map(|score| self.working.beatmaps.get(&score.beatmap_id))
            .map(|beatmap| beatmap.beatmapset_id)
            .filter(|beatmapset_id| pack.beatmapset_ids.contains(beatmapset_id))
            .collect();
        Ok(completed.len() as u32)
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let MemoryStorageTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}
