use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreItem {
    pub score_id: u64,
    #[serde(default)]
    pub force_reprocess: bool,
    #[serde(default)]
    pub tries: u32,
}

impl ScoreItem {
    pub const fn new(score_id: u64) -> Self {
        Self {
            score_id,
            force_reprocess: false,
            tries: 0,
        }
    }

    pub const fn forced(score_id: u64) -> Self {
        Self {
            score_id,
            force_reprocess: true,
            tries: 0,
        }
    }

    pub fn retried(&self) -> Self {
        Self {
            tries: self.tries + 1,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Processed,
    Reprocessed { previous_version: u32 },
    AlreadyProcessed,
}
