pub mod requeue_outdated_scores;
