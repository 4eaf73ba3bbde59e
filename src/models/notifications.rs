use crate::models::medals::MedalDefinition;
use crate::models::rulesets::Ruleset;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    MedalAwarded {
        user_id: u32,
        achievement_id: u32,
        slug: String,
        beatmap_id: Option<u32>,
        awarded_at: DateTime<Utc>,
    },
    UserPerformanceChanged {
        user_id: u32,
        ruleset: Ruleset,
        previous_pp: f64,
        pp: f64,
    },
}

/// Side effects produced inside the transaction, executed only once it commits.
#[derive(Debug, Clone, PartialEq)]
pub enum PostCommitAction {
    GrantMedal {
        user_id: u32,
        medal: MedalDefinition,
        beatmap_id: Option<u32>,
    },
    Notify(NotificationEvent),
}
