//! Controller configuration.

use std::time::Duration;

use lessonflow_reveal::RevealConfig;

/// Fallback shown when an `ai-action` step defines none of its own.
pub const DEFAULT_FALLBACK_CONTENT: &str =
    "Here's an example I prepared earlier. Take a look, then let's keep going.";

/// Tunables for a guided lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    /// Reveal pacing.
    pub reveal: RevealConfig,
    /// Time budget for one generation call. Exceeding it counts as failure.
    pub generation_timeout: Duration,
    /// Content substituted on generation failure when the step has no
    /// `fallback_content`.
    pub default_fallback: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            reveal: RevealConfig::default(),
            generation_timeout: Duration::from_secs(20),
            default_fallback: DEFAULT_FALLBACK_CONTENT.to_owned(),
        }
    }
}
