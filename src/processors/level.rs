const LEVEL_SCALING_CAP: u32 = 100;
const SCORE_PER_LEVEL_PAST_CAP: f64 = 99_999_999_999.0;

/// Total score required to reach `level`.
pub fn required_score(level: u32) -> f64 {
    match level {
        0 | 1 => 0.0,
        2..=LEVEL_SCALING_CAP => {
            let n = level as f64;
            5000.0 / 3.0 * (4.0 * n.powi(3) - 3.0 * n.powi(2) - n) + 1.25 * 1.8f64.powf(n - 60.0)
        }
        _ => {
            required_score(LEVEL_SCALING_CAP)
                + (level - LEVEL_SCALING_CAP) as f64 * SCORE_PER_LEVEL_PAST_CAP
        }
    }
}

/// Level reached with `total_score`, including the progress towards the next one.
pub fn level_for_score(total_score: i64) -> f64 {
    let score = total_score.max(0) as f64;

    let mut level = 1;
    if score >= required_score(LEVEL_SCALING_CAP) {
        level = LEVEL_SCALING_CAP
            + ((score - required_score(LEVEL_SCALING_CAP)) / SCORE_PER_LEVEL_PAST_CAP) as u32;
    } else {
        while required_score(level + 1) <= score {
            level += 1;
        }
    }

    let current = required_score(level);
    let next = required_score(level + 1);
    level as f64 + (score - current) / (next - current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn starts_at_level_one() {
        assert_eq!(level_for_score(0), 1.0);
        assert_eq!(level_for_score(-500), 1.0);
    }

    #[rstest]
    #[case(2)]
    #[case(10)]
    #[case(60)]
    #[case(100)]
    #[case(101)]
    fn reaching_the_requirement_gives_a_whole_level(#[case] level: u32) {
        let score = required_score(level).ceil() as i64;
        let computed = level_for_score(score);
        assert!(computed >= level as f64);
        assert!(computed < level as f64 + 0.01);
    }

    #[test]
    fn reports_progress_between_levels() {
        let halfway = (required_score(2) + required_score(3)) / 2.0;
        let level = level_for_score(halfway as i64);
        assert!((level - 2.5).abs() < 1e-3);
    }

    #[test]
    fn grows_linearly_past_the_cap() {
        let cap = required_score(100);
        let gap = required_score(102) - cap;
        assert!((gap - 2.0 * 99_999_999_999.0).abs() < 1.0);
    }
}
