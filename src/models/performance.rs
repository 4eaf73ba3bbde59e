/// The best pp-bearing score of a user on one beatmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSample {
    pub beatmap_id: u32,
    pub pp: f64,
    /// Accuracy between 0 and 1.
    pub accuracy: f64,
}

/// Adjusts the sample set around the score being applied or reverted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceSampleFilter {
    /// Considered even when it is not preserved yet.
    pub include_score_id: Option<u64>,
    pub exclude_score_id: Option<u64>,
}

impl PerformanceSampleFilter {
    pub const fn including(score_id: u64) -> Self {
        Self {
            include_score_id: Some(score_id),
            exclude_score_id: None,
        }
    }

    pub const fn excluding(score_id: u64) -> Self {
        Self {
            include_score_id: None,
            exclude_score_id: Some(score_id),
        }
    }
}
