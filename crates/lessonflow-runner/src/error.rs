//! Lessonflow runner — error types.

use lessonflow_core::error::LessonError;
use thiserror::Error;

/// Startup and runtime errors for the runner.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The lesson could not be loaded or a collaborator could not be built.
    #[error("lesson error: {0}")]
    Lesson(#[from] LessonError),

    /// Terminal or task I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_error_converts_and_keeps_reason() {
        let err: AppError = LessonError::ContentUnavailable("lesson \"x\" not found".to_owned()).into();

        assert!(matches!(err, AppError::Lesson(LessonError::ContentUnavailable(_))));
        assert_eq!(
            err.to_string(),
            "lesson error: lesson content unavailable: lesson \"x\" not found"
        );
    }

    #[test]
    fn test_config_error_message() {
        let err = AppError::Config("LESSONFLOW_LESSON_ID must be set".to_owned());

        assert_eq!(err.to_string(), "configuration error: LESSONFLOW_LESSON_ID must be set");
    }
}
