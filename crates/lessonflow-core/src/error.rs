//! Lesson error types.

use thiserror::Error;

/// Caller-facing error type for lesson flows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LessonError {
    /// A choice was selected that the current step does not offer, or the
    /// current step offers no choices at all.
    #[error("invalid choice {choice:?} for step {step_id}")]
    InvalidChoice {
        /// The step that was current when the choice arrived.
        step_id: String,
        /// The rejected choice.
        choice: String,
    },

    /// The step list could not be fetched, was empty, or is malformed.
    #[error("lesson content unavailable: {0}")]
    ContentUnavailable(String),

    /// A store or network failure reported by an adapter.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    /// The lesson controller behind a handle has already stopped.
    #[error("lesson controller is no longer running")]
    ControllerClosed,
}
