use crate::models::rulesets::Ruleset;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct MedalDefinition {
    pub achievement_id: u32,
    pub slug: String,
    pub name: String,
    pub grouping: String,
    pub ordering: u32,
    pub ruleset: Option<Ruleset>,
    pub enabled: bool,
}

impl MedalDefinition {
    pub fn applies_to(&self, ruleset: Ruleset) -> bool {
        self.enabled && self.ruleset.is_none_or(|r| r == ruleset)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MedalGrant {
    pub user_id: u32,
    pub achievement_id: u32,
    pub beatmap_id: Option<u32>,
    pub achieved_at: DateTime<Utc>,
}
