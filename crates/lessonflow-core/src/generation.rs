//! Content generation service abstraction.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Why a generation call did not produce usable content.
///
/// Never surfaced to learners: the lesson controller replaces any of these
/// with the step's fallback content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The service answered but declined the request.
    #[error("generation rejected: {0}")]
    Rejected(String),

    /// The service could not be reached.
    #[error("generation transport failure: {0}")]
    Transport(String),

    /// The service answered with something that is not usable content.
    #[error("malformed generation response: {0}")]
    Malformed(String),

    /// No answer arrived within the time budget.
    #[error("generation timed out after {0:?}")]
    TimedOut(Duration),
}

/// An external text generator.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate content for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
