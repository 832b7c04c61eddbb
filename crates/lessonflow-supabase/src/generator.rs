//! Character content from the `generate-character-content` edge function.

use async_trait::async_trait;
use lessonflow_core::error::LessonError;
use lessonflow_core::generation::{ContentGenerator, GenerationError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::{authorize, build_client, ensure_success};
use crate::config::SupabaseConfig;

/// Request body of the edge function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest<'a> {
    /// Voice of the guide character.
    pub character_type: &'a str,
    /// What kind of content to produce.
    pub content_type: &'a str,
    /// The step's prompt.
    pub topic: &'a str,
    /// Who the content is for.
    pub target_audience: &'a str,
}

/// Response body of the edge function.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationResponse {
    /// Whether the function produced content.
    #[serde(default)]
    pub success: bool,
    /// The generated text.
    #[serde(default)]
    pub content: Option<String>,
    /// Reason for a failure.
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerationResponse {
    /// Extracts usable content.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Rejected` unless `success` is set and
    /// `content` is non-blank.
    pub fn into_content(self) -> Result<String, GenerationError> {
        match self.content {
            Some(content) if self.success && !content.trim().is_empty() => Ok(content),
            _ => Err(GenerationError::Rejected(
                self.error
                    .unwrap_or_else(|| "no content generated".to_owned()),
            )),
        }
    }
}

/// Calls the hosted content generation function.
#[derive(Debug, Clone)]
pub struct EdgeFunctionGenerator {
    config: SupabaseConfig,
    http_client: Client,
}

impl EdgeFunctionGenerator {
    const TARGET_AUDIENCE: &'static str = "learners";

    /// Creates the generator.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Infrastructure` if the HTTP client cannot be
    /// built.
    pub fn new(config: SupabaseConfig) -> Result<Self, LessonError> {
        let http_client = build_client(&config)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn request_for<'a>(&'a self, prompt: &'a str) -> GenerationRequest<'a> {
        GenerationRequest {
            character_type: &self.config.character_type,
            content_type: &self.config.content_type,
            topic: prompt,
            target_audience: Self::TARGET_AUDIENCE,
        }
    }
}

#[async_trait]
impl ContentGenerator for EdgeFunctionGenerator {
    #[instrument(skip(self, prompt), fields(character = %self.config.character_type))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = self.config.endpoint("functions/v1/generate-character-content");
        let request = self.http_client.post(url).json(&self.request_for(prompt));
        let response = authorize(request, &self.config)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    GenerationError::TimedOut(self.config.request_timeout)
                } else {
                    GenerationError::Transport(err.to_string())
                }
            })?;
        let response = ensure_success(response)
            .await
            .map_err(GenerationError::Transport)?;
        let body: GenerationResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::Malformed(err.to_string()))?;

        let content = body.into_content()?;
        debug!(chars = content.chars().count(), "content generated");
        Ok(content)
    }
}
