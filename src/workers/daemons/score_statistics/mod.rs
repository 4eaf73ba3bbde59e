pub mod handlers;
pub mod worker;

use crate::adapters::notifications::RedisNotifier;
use crate::adapters::performance_service::PerformanceServiceClient;
use crate::common::init;
use crate::processors::StatisticsPipeline;
use crate::settings::AppSettings;
use crate::usecases::beatmaps::BeatmapLookup;
use crate::usecases::medals::MedalDefinitionCache;
use crate::usecases::score_statistics::ScoreStatisticsProcessor;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use worker::{WorkerOptions, run_worker};

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = init::initialize_state(settings).await?;

    let calculator = Arc::new(PerformanceServiceClient::new(
        settings.performance_service_base_url.as_str(),
    ));
    let beatmaps = Arc::new(BeatmapLookup::new(
        calculator,
        settings.beatmap_cache_capacity,
        settings.beatmap_cache_ttl,
    ));
    let medals = Arc::new(MedalDefinitionCache::new());
    let notifier = Arc::new(RedisNotifier::new(
        state.redis.clone(),
        &settings.notification_channel,
    ));
    let pipeline = StatisticsPipeline::new(medals);
    info!(
        version = pipeline.version(),
        processors = ?pipeline.processor_names(),
        "Loaded statistics pipeline"
    );
    let processor = Arc::new(ScoreStatisticsProcessor::new(
        state.storage.clone(),
        pipeline,
        beatmaps.clone(),
        notifier,
    ));

    let cancellation = CancellationToken::new();
    tokio::spawn(shutdown_on_ctrl_c(cancellation.clone()));
    tokio::spawn(listen_for_invalidations(
        settings.redis_url.clone(),
        settings.beatmap_invalidation_channel.clone(),
        beatmaps,
        cancellation.clone(),
    ));

    let options = WorkerOptions {
        max_tries: settings.max_tries,
        discord_webhook_url: settings.discord_webhook_url.clone(),
        ..Default::default()
    };
    info!(
        queue = %settings.queue_name,
        workers = settings.worker_count,
        "Starting score statistics workers"
    );
    let workers = (0..settings.worker_count).map(|worker_id| {
        tokio::spawn(run_worker(
            worker_id,
            processor.clone(),
            state.queue.clone(),
            cancellation.clone(),
            options.clone(),
        ))
    });
    for result in futures::future::join_all(workers).await {
        if let Err(e) = result {
            error!("Worker task panicked: {e}");
        }
    }
    Ok(())
}

async fn shutdown_on_ctrl_c(cancellation: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down, waiting for in-flight scores"),
        Err(e) => error!("Failed to listen for ctrl-c: {e}"),
    }
    cancellation.cancel();
}

const RESUBSCRIBE_BACKOFF_BASE: Duration = Duration::from_millis(500);
const RESUBSCRIBE_BACKOFF_MAX: Duration = Duration::from_secs(30);

fn resubscribe_delay(failures: u32) -> Duration {
    let factor = 2u32.saturating_pow(failures.saturating_sub(1));
    RESUBSCRIBE_BACKOFF_BASE
        .saturating_mul(factor)
        .min(RESUBSCRIBE_BACKOFF_MAX)
}

/// Runs `subscribe` until cancelled, starting it again with a backoff whenever it fails.
/// `subscribe` receives whether this is a resubscription.
async fn keep_subscribed<F, Fut>(channel: &str, cancellation: &CancellationToken, mut subscribe: F)
where
    F: FnMut(bool) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let mut failures = 0;
    let mut resubscribing = false;
    while !cancellation.is_cancelled() {
        let started = Instant::now();
        let Err(e) = subscribe(resubscribing).await else {
            return;
        };
        resubscribing = true;
        if started.elapsed() >= RESUBSCRIBE_BACKOFF_MAX {
            failures = 0;
        }
        failures += 1;

        let delay = resubscribe_delay(failures);
        error!(channel, failures, ?delay, "Lost subscription, resubscribing: {e}");
        tokio::select! {
            _ = cancellation.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

async fn listen_for_invalidations(
    redis_url: String,
    channel: String,
    beatmaps: Arc<BeatmapLookup>,
    cancellation: CancellationToken,
) {
    keep_subscribed(&channel, &cancellation, |resubscribing| {
        consume_invalidations(&redis_url, &channel, &beatmaps, &cancellation, resubscribing)
    })
    .await;
}

async fn consume_invalidations(
    redis_url: &str,
    channel: &str,
    beatmaps: &BeatmapLookup,
    cancellation: &CancellationToken,
    resubscribing: bool,
) -> anyhow::Result<()> {
    let redis_client = redis::Client::open(redis_url)?;
    let mut pubsub = redis_client.get_async_pubsub().await?;
    pubsub.subscribe(channel).await?;
    if resubscribing {
        // messages sent while disconnected are lost
        beatmaps.invalidate_all();
    }
    info!(channel, "Listening for beatmap invalidations");

    let mut messages = pubsub.on_message();
    loop {
        let msg = tokio::select! {
            _ = cancellation.cancelled() => return Ok(()),
            msg = messages.next() => msg,
        };
        let Some(msg) = msg else {
            anyhow::bail!("pubsub connection closed");
        };
        if let Err(e) = handlers::invalidate_beatmap::handle(beatmaps, msg).await {
            warn!(channel, error = e.code(), "Failed to handle invalidation");
        }
    }
}
