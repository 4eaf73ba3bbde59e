pub mod score_statistics;
