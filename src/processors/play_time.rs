use crate::common::error::ServiceResult;
use crate::models::beatmaps::Beatmap;
use crate::models::mods;
use crate::models::scores::Score;
use crate::processors::versioning::Behaviours;
use crate::processors::{ProcessContext, StatProcessor};
use async_trait::async_trait;

const HISTORY: Behaviours<()> = Behaviours::new(&[(3, ())]);

pub struct PlayTimeProcessor;

/// Seconds spent on the play, never longer than the beatmap at the play's rate.
pub fn seconds_played(score: &Score, beatmap: &Beatmap) -> i64 {
    let rate = mods::clock_rate(&score.mods);
    let length = (beatmap.total_length as f64 / rate).round() as i64;

    match score.started_at {
        Some(started_at) => (score.ended_at - started_at).num_seconds().clamp(0, length),
        None if score.passed => length,
        None => 0,
    }
}

#[async_trait]
impl StatProcessor for PlayTimeProcessor {
    fn name(&self) -> &'static str {
        "play_time"
    }

    fn runs_on_failed_scores(&self) -> bool {
        true
    }

    fn runs_on_legacy_scores(&self) -> bool {
        false
    }

    async fn apply(&self, ctx: &mut ProcessContext<'_>) -> ServiceResult<()> {
        if HISTORY.is_active(ctx.version) {
            ctx.stats.total_seconds_played += seconds_played(ctx.score, ctx.beatmap);
        }
        Ok(())
    }

    async fn revert(&self, ctx: &mut ProcessContext<'_>, previous_version: u32) -> ServiceResult<()> {
        if HISTORY.is_active(previous_version) {
            ctx.stats.total_seconds_played -= seconds_played(ctx.score, ctx.beatmap);
        }
        Ok(())
    }
}
