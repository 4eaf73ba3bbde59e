use crate::adapters::notifications::Notifier;
use crate::common::error::{AppError, ServiceResult};
use crate::models::notifications::{NotificationEvent, PostCommitAction};
use crate::models::process_history::ProcessAction;
use crate::models::queue::{ProcessOutcome, ScoreItem};
use crate::processors::{ProcessContext, StatisticsPipeline};
use crate::storage::{Storage, StorageTransaction};
use crate::usecases::beatmaps::BeatmapLookup;
use crate::usecases::medals;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Smallest pp change worth telling other services about.
const PERFORMANCE_NOTIFY_THRESHOLD: f64 = 0.01;

struct Processed {
    outcome: ProcessOutcome,
    actions: Vec<PostCommitAction>,
}

/// Applies one score to its owner's aggregate, exactly once per pipeline version.
pub struct ScoreStatisticsProcessor {
    storage: Arc<dyn Storage>,
    pipeline: StatisticsPipeline,
    beatmaps: Arc<BeatmapLookup>,
    notifier: Arc<dyn Notifier>,
}

impl ScoreStatisticsProcessor {
    pub fn new(
        storage: Arc<dyn Storage>,
        pipeline: StatisticsPipeline,
        beatmaps: Arc<BeatmapLookup>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            storage,
            pipeline,
            beatmaps,
            notifier,
        }
    }

    pub async fn process(&self, item: &ScoreItem) -> ServiceResult<ProcessOutcome> {
        let mut tx = self.storage.begin().await?;
        match self.process_in_transaction(tx.as_mut(), item).await {
            Ok(Some(processed)) => {
                tx.commit().await?;
                self.run_post_commit_actions(processed.actions).await;
                Ok(processed.outcome)
            }
            Ok(None) => {
                tx.rollback().await?;
                Ok(ProcessOutcome::AlreadyProcessed)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    error!(
                        score_id = item.score_id,
                        "Failed to roll back score processing: {rollback_error}"
                    );
                }
                Err(e)
            }
        }
    }

    async fn process_in_transaction(
        &self,
        tx: &mut dyn StorageTransaction,
        item: &ScoreItem,
    ) -> ServiceResult<Option<Processed>> {
        let Some(score) = tx.fetch_score(item.score_id).await? else {
            return Err(AppError::ScoresNotFound);
        };
        if score.score_id == 0 || score.user_id == 0 {
            return Err(AppError::ScoresInvalid("Score has no owner."));
        }

        let mut stats = tx
            .fetch_user_stats_for_update(score.user_id, score.ruleset)
            .await?;
        let history = tx.fetch_process_history(score.score_id).await?;
        let version = self.pipeline.version();
        let action = ProcessAction::decide(history.as_ref(), version, item.force_reprocess);
        if action == ProcessAction::Skip {
            info!(
                score_id = score.score_id,
                processed_version = ?history.map(|h| h.processed_version),
                "Score already processed"
            );
            return Ok(None);
        }

        let beatmap = self.beatmaps.fetch_beatmap(tx, score.beatmap_id).await?;
        let previous_pp = stats.pp;
        let mut actions = vec![];
        let mut ctx = ProcessContext {
            score: &score,
            beatmap: &beatmap,
            stats: &mut stats,
            version,
            tx: &mut *tx,
            beatmaps: &self.beatmaps,
            actions: &mut actions,
        };

        let outcome = match action {
            ProcessAction::Reprocess { previous_version } => {
                self.pipeline.revert(&mut ctx, previous_version).await?;
                ProcessOutcome::Reprocessed { previous_version }
            }
            _ => ProcessOutcome::Processed,
        };
        self.pipeline.apply(&mut ctx).await?;

        stats.last_played = stats.last_played.max(Some(score.ended_at));
        tx.save_user_stats(&stats).await?;
        tx.save_process_history(score.score_id, version).await?;

        if (stats.pp - previous_pp).abs() >= PERFORMANCE_NOTIFY_THRESHOLD
            && !tx.is_user_restricted(score.user_id).await?
        {
            actions.push(PostCommitAction::Notify(
                NotificationEvent::UserPerformanceChanged {
                    user_id: score.user_id,
                    ruleset: score.ruleset,
                    previous_pp,
                    pp: stats.pp,
                },
            ));
        }

        info!(
            score_id = score.score_id,
            user_id = score.user_id,
            ruleset = score.ruleset.short_name(),
            version,
            ?outcome,
            "Processed score"
        );
        Ok(Some(Processed { outcome, actions }))
    }

    async fn run_post_commit_actions(&self, actions: Vec<PostCommitAction>) {
        for action in actions {
            match action {
                PostCommitAction::GrantMedal {
                    user_id,
                    medal,
                    beatmap_id,
                } => match medals::grant(self.storage.as_ref(), user_id, &medal, beatmap_id).await
                {
                    Ok(Some(event)) => self.notifier.notify(event),
                    Ok(None) => {}
                    Err(e) => warn!(
                        user_id,
                        achievement_id = medal.achievement_id,
                        error = e.code(),
                        "Failed to grant medal"
                    ),
                },
                PostCommitAction::Notify(event) => self.notifier.notify(event),
            }
        }
    }
}
