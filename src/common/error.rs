use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Unexpected,
    InternalServerError(&'static str),

    BeatmapsNotFound,

    DifficultyAttributesNotFound,
    PerformanceCalculationFailed,

    QueueDecodingFailed,

    ScoresNotFound,
    /// A processor refused to continue because an invariant would be violated.
    ScoresInvalid(&'static str),

    UsersNotFound,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn as_str(&self) -> &str {
        self.code()
    }

    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::InternalServerError(_) => "internal_server_error",

            AppError::BeatmapsNotFound => "beatmaps.not_found",

            AppError::DifficultyAttributesNotFound => "difficulty.attributes_not_found",
            AppError::PerformanceCalculationFailed => "difficulty.performance_failed",

            AppError::QueueDecodingFailed => "queue.decoding_failed",

            AppError::ScoresNotFound => "scores.not_found",
            AppError::ScoresInvalid(_) => "scores.invalid",

            AppError::UsersNotFound => "users.not_found",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::InternalServerError(_) => "An internal server error has occurred.",

            AppError::BeatmapsNotFound => "Beatmap could not be found.",

            AppError::DifficultyAttributesNotFound => {
                "No difficulty attributes are available for this beatmap and mod combination."
            }
            AppError::PerformanceCalculationFailed => "Failed to calculate performance.",

            AppError::QueueDecodingFailed => "Failed to decode queue item.",

            AppError::ScoresNotFound => "Score could not be found.",
            AppError::ScoresInvalid(reason) => *reason,

            AppError::UsersNotFound => "This user does not exist.",
        }
    }

    /// Whether the same queue item may succeed when delivered again.
    pub const fn is_retryable(&self) -> bool {
        match self {
            AppError::Unexpected
            | AppError::InternalServerError(_)
            | AppError::BeatmapsNotFound
            | AppError::DifficultyAttributesNotFound
            | AppError::PerformanceCalculationFailed => true,

            AppError::QueueDecodingFailed
            | AppError::ScoresNotFound
            | AppError::ScoresInvalid(_)
            | AppError::UsersNotFound => false,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_foreign_errors_into_unexpected() {
        let err: AppError = std::io::Error::other("connection reset").into();
        assert_eq!(err, AppError::Unexpected);
        assert!(err.is_retryable());
    }

    #[test]
    fn hard_aborts_are_not_retried() {
        let err = AppError::ScoresInvalid("score has no identity");
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "scores.invalid");
        assert_eq!(err.message(), "score has no identity");
    }
}
