use crate::common::env::FromEnv;
use std::env;
use std::ops::Deref;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::Level;

pub struct AppSettings {
    pub app_component: String,
    pub level: Level,
    pub log_json: bool,

    pub database_url: String,
    pub db_max_connections: usize,
    pub db_wait_timeout: Duration,

    pub redis_url: String,
    pub redis_max_connections: usize,
    pub redis_connection_timeout: Duration,
    pub redis_response_timeout: Duration,
    pub redis_wait_timeout: Duration,

    pub queue_name: String,
    pub worker_count: usize,
    pub max_tries: u32,
    pub requeue_batch_size: u32,

    pub performance_service_base_url: String,

    pub beatmap_cache_capacity: usize,
    pub beatmap_cache_ttl: Duration,
    pub beatmap_invalidation_channel: String,

    pub notification_channel: String,
    pub discord_webhook_url: Option<String>,
}

impl AppSettings {
    pub fn load_from_env() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        let app_component = env::var("APP_COMPONENT")?;
        let level = Level::from_env("LOG_LEVEL")?;
        let log_json = bool::from_env_or("LOG_JSON", false)?;

        let database_url = env::var("DATABASE_URL")?;
        let db_max_connections = usize::from_env("DB_MAX_CONNECTIONS")?;
        let db_wait_timeout_secs = u64::from_env("DB_WAIT_TIMEOUT_SECS")?;
        let db_wait_timeout = Duration::from_secs(db_wait_timeout_secs);

        let redis_url = env::var("REDIS_URL")?;
        let redis_max_connections = usize::from_env("REDIS_MAX_CONNECTIONS")?;
        let redis_connection_timeout_secs = u64::from_env("REDIS_CONNECTION_TIMEOUT_SECS")?;
        let redis_connection_timeout = Duration::from_secs(redis_connection_timeout_secs);
        let redis_response_timeout_secs = u64::from_env("REDIS_RESPONSE_TIMEOUT_SECS")?;
        let redis_response_timeout = Duration::from_secs(redis_response_timeout_secs);
        let redis_wait_timeout_secs = u64::from_env("REDIS_WAIT_TIMEOUT_SECS")?;
        let redis_wait_timeout = Duration::from_secs(redis_wait_timeout_secs);

        let queue_name = String::from_env_or("QUEUE_NAME", "osu-queue:score-statistics".into())?;
        let worker_count = usize::from_env_or("WORKER_COUNT", 4)?;
        let max_tries = u32::from_env_or("MAX_TRIES", 5)?;
        let requeue_batch_size = u32::from_env_or("REQUEUE_BATCH_SIZE", 1000)?;

        let performance_service_base_url = env::var("PERFORMANCE_SERVICE_BASE_URL")?;

        let beatmap_cache_capacity = usize::from_env_or("BEATMAP_CACHE_CAPACITY", 10_000)?;
        let beatmap_cache_ttl_secs = u64::from_env_or("BEATMAP_CACHE_TTL_SECS", 3600)?;
        let beatmap_cache_ttl = Duration::from_secs(beatmap_cache_ttl_secs);
        let beatmap_invalidation_channel = String::from_env_or(
            "BEATMAP_INVALIDATION_CHANNEL",
            "osu-queue:beatmap-invalidation".into(),
        )?;

        let notification_channel = String::from_env_or(
            "NOTIFICATION_CHANNEL",
            "osu-queue:score-statistics:notifications".into(),
        )?;
        let discord_webhook_url = env::var("DISCORD_WEBHOOK_URL").ok();

        Ok(AppSettings {
            app_component,
            level,
            log_json,

            database_url,
            db_max_connections,
            db_wait_timeout,

            redis_url,
            redis_max_connections,
            redis_connection_timeout,
            redis_response_timeout,
            redis_wait_timeout,

            queue_name,
            worker_count,
            max_tries,
            requeue_batch_size,

            performance_service_base_url,

            beatmap_cache_capacity,
            beatmap_cache_ttl,
            beatmap_invalidation_channel,

            notification_channel,
            discord_webhook_url,
        })
    }

    pub fn get() -> &'static AppSettings {
        settings()
    }
}

pub fn settings() -> &'static AppSettings {
    static SETTINGS: LazyLock<AppSettings> =
        LazyLock::new(|| AppSettings::load_from_env().expect("Failed to load settings"));
    SETTINGS.deref()
}
