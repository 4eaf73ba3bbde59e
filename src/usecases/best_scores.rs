use crate::common::error::ServiceResult;
use crate::models::scores::Score;
use crate::storage::StorageTransaction;

/// A score whose contribution is part of the aggregate, tagged with the pipeline version
/// that contribution was made under.
#[derive(Debug, Clone, PartialEq)]
pub struct CountedScore {
    pub score: Score,
    pub version: u32,
}

impl CountedScore {
    pub fn score_id(&self) -> u64 {
        self.score.score_id
    }
}

/// Change of the best score of a (user, beatmap, ruleset) group caused by one score.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BestScoreDelta {
    /// Score whose contribution leaves the aggregate.
    pub remove: Option<CountedScore>,
    /// Score whose contribution enters the aggregate.
    pub add: Option<CountedScore>,
}

impl BestScoreDelta {
    pub fn is_empty(&self) -> bool {
        self.remove.is_none() && self.add.is_none()
    }
}

async fn is_best(tx: &mut dyn StorageTransaction, score: &Score) -> ServiceResult<bool> {
    let best = tx.fetch_best_score(score, 0).await?;
    Ok(best.is_some_and(|best| best.score_id == score.score_id))
}

/// The runner-up of the group, counted under its own marker version.
async fn runner_up(
    tx: &mut dyn StorageTransaction,
    score: &Score,
) -> ServiceResult<Option<CountedScore>> {
    let Some(runner_up) = tx.fetch_best_score(score, 1).await? else {
        return Ok(None);
    };
    let history = tx.fetch_process_history(runner_up.score_id).await?;
    Ok(history.map(|history| CountedScore {
        score: runner_up,
        version: history.processed_version,
    }))
}

/// Applying a score that became the best replaces the previous best.
pub async fn delta_on_apply(
    tx: &mut dyn StorageTransaction,
    score: &Score,
    version: u32,
) -> ServiceResult<BestScoreDelta> {
    if !is_best(tx, score).await? {
        return Ok(BestScoreDelta::default());
    }

    let previous_best = runner_up(tx, score).await?;
    Ok(BestScoreDelta {
        remove: previous_best,
        add: Some(CountedScore {
            score: score.clone(),
            version,
        }),
    })
}

/// Reverting the best score restores the runner-up.
pub async fn delta_on_revert(
    tx: &mut dyn StorageTransaction,
    score: &Score,
    previous_version: u32,
) -> ServiceResult<BestScoreDelta> {
    if !is_best(tx, score).await? {
        return Ok(BestScoreDelta::default());
    }

    let restored = runner_up(tx, score).await?;
    Ok(BestScoreDelta {
        remove: Some(CountedScore {
            score: score.clone(),
            version: previous_version,
        }),
        add: restored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scores::ScoreRank;
    use crate::models::scores::tests::sample_score;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    #[tokio::test]
    async fn new_best_replaces_previous_best() {
        let storage = MemoryStorage::new();
        storage.insert_score(sample_score(1, 1000, ScoreRank::A)).await;
        storage.set_process_history(1, 7).await;
        let better = sample_score(2, 2000, ScoreRank::S);
        storage.insert_score(better.clone()).await;

        let mut tx = storage.begin().await.unwrap();
        let delta = delta_on_apply(tx.as_mut(), &better, 7).await.unwrap();
        assert_eq!(delta.remove.map(|s| s.score_id()), Some(1));
        assert_eq!(delta.add.map(|s| s.score_id()), Some(2));

        let delta = delta_on_revert(tx.as_mut(), &better, 7).await.unwrap();
        assert_eq!(delta.remove.map(|s| s.score_id()), Some(2));
        assert_eq!(delta.add.map(|s| s.score_id()), Some(1));
    }

    #[tokio::test]
    async fn worse_score_changes_nothing() {
        let storage = MemoryStorage::new();
        storage.insert_score(sample_score(1, 2000, ScoreRank::S)).await;
        storage.set_process_history(1, 7).await;
        let worse = sample_score(2, 1000, ScoreRank::A);
        storage.insert_score(worse.clone()).await;

        let mut tx = storage.begin().await.unwrap();
        assert!(delta_on_apply(tx.as_mut(), &worse, 7).await.unwrap().is_empty());
        assert!(delta_on_revert(tx.as_mut(), &worse, 7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ties_prefer_the_newer_score() {
        let storage = MemoryStorage::new();
        storage.insert_score(sample_score(1, 1000, ScoreRank::A)).await;
        storage.set_process_history(1, 7).await;
        let newer = sample_score(2, 1000, ScoreRank::A);
        storage.insert_score(newer.clone()).await;

        let mut tx = storage.begin().await.unwrap();
        let delta = delta_on_apply(tx.as_mut(), &newer, 7).await.unwrap();
        assert_eq!(delta.remove.map(|s| s.score_id()), Some(1));
        assert_eq!(delta.add.map(|s| s.score_id()), Some(2));
    }

    #[tokio::test]
    async fn unpreserved_scores_are_only_seen_as_reference() {
        let storage = MemoryStorage::new();
        let mut stale = sample_score(1, 5000, ScoreRank::S);
        stale.preserve = false;
        storage.insert_score(stale).await;
        storage.set_process_history(1, 7).await;
        let current = sample_score(2, 1000, ScoreRank::A);
        storage.insert_score(current.clone()).await;

        let mut tx = storage.begin().await.unwrap();
        let delta = delta_on_apply(tx.as_mut(), &current, 7).await.unwrap();
        assert_eq!(delta.remove, None);
        assert_eq!(delta.add.map(|s| s.score_id()), Some(2));
    }

    #[tokio::test]
    async fn unprocessed_scores_do_not_compete() {
        let storage = MemoryStorage::new();
        storage.insert_score(sample_score(1, 5000, ScoreRank::S)).await;
        let current = sample_score(2, 1000, ScoreRank::A);
        storage.insert_score(current.clone()).await;

        let mut tx = storage.begin().await.unwrap();
        let delta = delta_on_apply(tx.as_mut(), &current, 7).await.unwrap();
        assert_eq!(delta.remove, None);
        assert_eq!(delta.add.map(|s| s.score_id()), Some(2));
    }

    #[tokio::test]
    async fn counted_scores_carry_their_marker_version() {
        let storage = MemoryStorage::new();
        storage.insert_score(sample_score(1, 1000, ScoreRank::X)).await;
        storage.set_process_history(1, 4).await;
        let better = sample_score(2, 2000, ScoreRank::A);
        storage.insert_score(better.clone()).await;

        let mut tx = storage.begin().await.unwrap();
        let delta = delta_on_apply(tx.as_mut(), &better, 7).await.unwrap();
        assert_eq!(delta.remove.as_ref().map(|s| s.version), Some(4));
        assert_eq!(delta.add.as_ref().map(|s| s.version), Some(7));

        let delta = delta_on_revert(tx.as_mut(), &better, 6).await.unwrap();
        assert_eq!(delta.remove.as_ref().map(|s| s.version), Some(6));
        assert_eq!(delta.add.as_ref().map(|s| s.version), Some(4));
    }
}
