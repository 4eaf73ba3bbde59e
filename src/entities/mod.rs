pub mod beatmaps;
pub mod medals;
pub mod scores;
pub mod stats;
