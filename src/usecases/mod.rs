pub mod beatmaps;
pub mod best_scores;
pub mod medals;
pub mod performance;
pub mod queue;
pub mod score_statistics;
