pub mod beatmaps;
pub mod medals;
pub mod mods;
pub mod notifications;
pub mod performance;
pub mod process_history;
pub mod queue;
pub mod rulesets;
pub mod scores;
pub mod stats;
