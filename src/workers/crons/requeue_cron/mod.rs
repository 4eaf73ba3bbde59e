pub mod tasks;

use crate::common::init;
use crate::cron_tasks;
use crate::settings::AppSettings;
use tasks::requeue_outdated_scores::requeue_outdated_scores;

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let ctx = init::initialize_state(settings).await?;
    cron_tasks! {
        &ctx,
        requeue_outdated_scores,
    }
    Ok(())
}
