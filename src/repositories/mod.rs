pub mod beatmaps;
pub mod medals;
pub mod process_history;
pub mod scores;
pub mod stats;
pub mod users;
