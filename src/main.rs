use score_statistics_processor::common::init;
use score_statistics_processor::settings::AppSettings;
use score_statistics_processor::workers::{crons, daemons};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::get();
    init::initialize_logging(settings);
    match settings.app_component.as_str() {
        "score-worker" => daemons::score_statistics::serve(settings).await,
        "requeue-cron" => crons::requeue_cron::serve(settings).await,
        component => anyhow::bail!("Unknown app component: {component}"),
    }
}
