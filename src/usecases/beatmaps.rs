use crate::common::cache::SlidingCache;
use crate::common::error::{AppError, ServiceResult};
use crate::models::beatmaps::{Beatmap, DifficultyAttributes};
use crate::models::mods::{self, ScoreMod};
use crate::models::rulesets::Ruleset;
use crate::models::scores::Score;
use crate::storage::StorageTransaction;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

/// Source of difficulty attributes and performance values.
#[async_trait]
pub trait DifficultyCalculator: Send + Sync {
    /// `None` when the beatmap cannot be rated with these mods.
    async fn compute_attributes(
        &self,
        beatmap: &Beatmap,
        ruleset: Ruleset,
        mods: &[ScoreMod],
    ) -> ServiceResult<Option<DifficultyAttributes>>;

    async fn compute_performance(
        &self,
        score: &Score,
        beatmap: &Beatmap,
        attributes: &DifficultyAttributes,
    ) -> ServiceResult<f64>;
}

type AttributesKey = (u32, Ruleset, String);

/// Read-through cache in front of beatmap rows and the difficulty calculator.
pub struct BeatmapLookup {
    beatmaps: SlidingCache<u32, Arc<Beatmap>>,
    attributes: SlidingCache<AttributesKey, DifficultyAttributes>,
    calculator: Arc<dyn DifficultyCalculator>,
    /// Bumped by every invalidation. A fill started before a bump is not cached.
    generation: AtomicU64,
}

impl BeatmapLookup {
    pub fn new(calculator: Arc<dyn DifficultyCalculator>, capacity: usize, ttl: Duration) -> Self {
        Self {
            beatmaps: SlidingCache::new(capacity, ttl),
            attributes: SlidingCache::new(capacity, ttl),
            calculator,
            generation: AtomicU64::new(0),
        }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn unchanged_since(&self, generation: u64) -> impl FnOnce() -> bool + '_ {
        move || self.generation() == generation
    }

    pub async fn fetch_beatmap(
        &self,
        tx: &mut dyn StorageTransaction,
        beatmap_id: u32,
    ) -> ServiceResult<Arc<Beatmap>> {
        if let Some(beatmap) = self.beatmaps.get(&beatmap_id) {
            return Ok(beatmap);
        }

        let generation = self.generation();
        let Some(beatmap) = tx.fetch_beatmap(beatmap_id).await? else {
            return Err(AppError::BeatmapsNotFound);
        };
        let beatmap = Arc::new(beatmap);
        self.beatmaps
            .insert_if(beatmap_id, beatmap.clone(), self.unchanged_since(generation));
        Ok(beatmap)
    }

    pub async fn fetch_difficulty_attributes(
        &self,
        beatmap: &Beatmap,
        ruleset: Ruleset,
        mods: &[ScoreMod],
    ) -> ServiceResult<Option<DifficultyAttributes>> {
        let key = (beatmap.beatmap_id, ruleset, mods::difficulty_key(mods));
        if let Some(attributes) = self.attributes.get(&key) {
            return Ok(Some(attributes));
        }

        let generation = self.generation();
        let attributes = self
            .calculator
            .compute_attributes(beatmap, ruleset, mods)
            .await?;
        if let Some(attributes) = attributes {
            self.attributes
                .insert_if(key, attributes, self.unchanged_since(generation));
        }
        Ok(attributes)
    }

    pub async fn compute_performance(
        &self,
        score: &Score,
        beatmap: &Beatmap,
        attributes: &DifficultyAttributes,
    ) -> ServiceResult<f64> {
        self.calculator
            .compute_performance(score, beatmap, attributes)
            .await
    }

    /// Drops the beatmap and every attribute set computed for it.
    pub fn invalidate(&self, beatmap_id: u32) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.beatmaps.remove(&beatmap_id);
        self.attributes.remove_where(|(id, _, _)| *id == beatmap_id);
        info!(beatmap_id, "Invalidated cached beatmap");
    }

    /// Drops everything, for when invalidations may have been missed.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.beatmaps.clear();
        self.attributes.clear();
        info!("Invalidated all cached beatmaps");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::beatmaps::RankedStatus;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct CountingCalculator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DifficultyCalculator for CountingCalculator {
        async fn compute_attributes(
            &self,
            _beatmap: &Beatmap,
            _ruleset: Ruleset,
            mods: &[ScoreMod],
        ) -> ServiceResult<Option<DifficultyAttributes>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(DifficultyAttributes {
                star_rating: 5.0 + mods.len() as f64,
                max_combo: 100,
            }))
        }

        async fn compute_performance(
            &self,
            _score: &Score,
            _beatmap: &Beatmap,
            _attributes: &DifficultyAttributes,
        ) -> ServiceResult<f64> {
            Ok(0.0)
        }
    }

    fn beatmap() -> Beatmap {
        Beatmap {
            beatmap_id: 100,
            beatmapset_id: 10,
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

    #[tokio::test]
    async fn caches_attributes_per_difficulty_mods() {
        let calculator = Arc::new(CountingCalculator::default());
        let lookup = BeatmapLookup::new(calculator.clone(), 16, Duration::from_secs(60));
        let beatmap = beatmap();

        let hidden = [ScoreMod::new("HD")];
        let hard_rock = [ScoreMod::new("HR")];
        lookup.fetch_difficulty_attributes(&beatmap, Ruleset::Osu, &[]).await.unwrap();
        lookup.fetch_difficulty_attributes(&beatmap, Ruleset::Osu, &hidden).await.unwrap();
        assert_eq!(calculator.calls.load(Ordering::SeqCst), 1);

        lookup.fetch_difficulty_attributes(&beatmap, Ruleset::Osu, &hard_rock).await.unwrap();
        assert_eq!(calculator.calls.load(Ordering::SeqCst), 2);

        lookup.invalidate(beatmap.beatmap_id);
        lookup.fetch_difficulty_attributes(&beatmap, Ruleset::Osu, &[]).await.unwrap();
        assert_eq!(calculator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn reads_beatmaps_through_cache() {
        let storage = MemoryStorage::new();
        let lookup = BeatmapLookup::new(
            Arc::new(CountingCalculator::default()),
            16,
            Duration::from_secs(60),
        );

        let mut tx = storage.begin().await.unwrap();
        let missing = lookup.fetch_beatmap(tx.as_mut(), 100).await;
        assert_eq!(missing.unwrap_err(), AppError::BeatmapsNotFound);
        tx.rollback().await.unwrap();

        storage.insert_beatmap(beatmap()).await;
        let mut tx = storage.begin().await.unwrap();
        let cached = lookup.fetch_beatmap(tx.as_mut(), 100).await.unwrap();
        tx.rollback().await.unwrap();

        let mut loved = beatmap();
        loved.ranked_status = RankedStatus::Loved;
        storage.insert_beatmap(loved).await;
        let mut tx = storage.begin().await.unwrap();
        let still_cached = lookup.fetch_beatmap(tx.as_mut(), 100).await.unwrap();
        assert_eq!(still_cached.ranked_status, cached.ranked_status);

        lookup.invalidate(100);
        let refreshed = lookup.fetch_beatmap(tx.as_mut(), 100).await.unwrap();
        assert_eq!(refreshed.ranked_status, RankedStatus::Loved);
    }

    /// Holds each computation until released.
    #[derive(Default)]
    struct GatedCalculator {
        calls: AtomicUsize,
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl DifficultyCalculator for GatedCalculator {
        async fn compute_attributes(
            &self,
            _beatmap: &Beatmap,
            _ruleset: Ruleset,
            _mods: &[ScoreMod],
        ) -> ServiceResult<Option<DifficultyAttributes>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            self.release.notified().await;
            Ok(Some(DifficultyAttributes {
                star_rating: 5.0,
                max_combo: 100,
            }))
        }

        async fn compute_performance(
            &self,
            _score: &Score,
            _beatmap: &Beatmap,
            _attributes: &DifficultyAttributes,
        ) -> ServiceResult<f64> {
            Ok(0.0)
        }
    }

    #[tokio::test]
    async fn invalidation_during_a_fill_keeps_the_result_out_of_the_cache() {
        let calculator = Arc::new(GatedCalculator::default());
        let lookup = Arc::new(BeatmapLookup::new(
            calculator.clone(),
            16,
            Duration::from_secs(60),
        ));

        let fill = tokio::spawn({
            let lookup = lookup.clone();
            async move {
                lookup
                    .fetch_difficulty_attributes(&beatmap(), Ruleset::Osu, &[])
                    .await
            }
        });
        calculator.started.notified().await;
        lookup.invalidate(100);
        calculator.release.notify_one();
        assert!(fill.await.unwrap().unwrap().is_some());

        calculator.release.notify_one();
        lookup
            .fetch_difficulty_attributes(&beatmap(), Ruleset::Osu, &[])
            .await
            .unwrap();
        assert_eq!(calculator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidating_everything_empties_both_caches() {
        let calculator = Arc::new(CountingCalculator::default());
        let lookup = BeatmapLookup::new(calculator.clone(), 16, Duration::from_secs(60));
        lookup.fetch_difficulty_attributes(&beatmap(), Ruleset::Osu, &[]).await.unwrap();

        lookup.invalidate_all();
        lookup.fetch_difficulty_attributes(&beatmap(), Ruleset::Osu, &[]).await.unwrap();
        assert_eq!(calculator.calls.load(Ordering::SeqCst), 2);
    }
}
