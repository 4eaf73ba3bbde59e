use crate::models::performance::PerformanceSample;

const WEIGHT_DECAY: f64 = 0.95;
const BONUS_PERFORMANCE: f64 = 416.6667;
const BONUS_DECAY: f64 = 0.9994;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPerformance {
    pub pp: f64,
    /// Percentage between 0 and 100.
    pub accuracy: f64,
}

/// Weights samples sorted by pp descending, adding the bonus for the number of plays.
pub fn weighted_performance(samples: &[PerformanceSample]) -> WeightedPerformance {
    if samples.is_empty() {
        return WeightedPerformance {
            pp: 0.0,
            accuracy: 0.0,
        };
    }

    let (mut pp, mut accuracy, mut weight) = (0.0, 0.0, 1.0);
    for sample in samples {
        pp += sample.pp * weight;
        accuracy += sample.accuracy * weight;
        weight *= WEIGHT_DECAY;
    }

    let count = samples.len() as i32;
    pp += BONUS_PERFORMANCE * (1.0 - BONUS_DECAY.powi(count));
    accuracy *= 100.0 / (20.0 * (1.0 - WEIGHT_DECAY.powi(count)));

    WeightedPerformance { pp, accuracy }
}
