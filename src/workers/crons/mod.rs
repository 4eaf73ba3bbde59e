pub mod requeue_cron;
pub mod tasks;
