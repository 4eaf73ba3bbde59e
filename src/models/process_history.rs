use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessHistory {
    pub score_id: u64,
    pub processed_version: u32,
    pub processed_at: DateTime<Utc>,
}

/// What the coordinator has to do with a score given its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessAction {
    Apply,
    Reprocess { previous_version: u32 },
    Skip,
}

impl ProcessAction {
    pub fn decide(history: Option<&ProcessHistory>, current_version: u32, force: bool) -> Self {
        match history {
            None => ProcessAction::Apply,
            Some(history) if force || history.processed_version < current_version => {
                ProcessAction::Reprocess {
                    previous_version: history.processed_version,
                }
            }
            Some(_) => ProcessAction::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(version: u32) -> ProcessHistory {
        ProcessHistory {
            score_id: 1,
            processed_version: version,
            processed_at: Utc::now(),
        }
    }

    #[test]
    fn decides_from_marker() {
        assert_eq!(ProcessAction::decide(None, 7, false), ProcessAction::Apply);
        assert_eq!(
            ProcessAction::decide(Some(&history(3)), 7, false),
            ProcessAction::Reprocess { previous_version: 3 }
        );
        assert_eq!(ProcessAction::decide(Some(&history(7)), 7, false), ProcessAction::Skip);
        assert_eq!(
            ProcessAction::decide(Some(&history(7)), 7, true),
            ProcessAction::Reprocess { previous_version: 7 }
        );
    }

    #[test]
    fn newer_markers_are_left_alone() {
        assert_eq!(ProcessAction::decide(Some(&history(9)), 7, false), ProcessAction::Skip);
    }
}
