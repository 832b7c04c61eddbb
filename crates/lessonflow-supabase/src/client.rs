//! Shared HTTP plumbing.

use lessonflow_core::error::LessonError;
use reqwest::{Client, RequestBuilder, Response};

use crate::config::SupabaseConfig;

/// Builds the HTTP client every adapter uses.
pub(crate) fn build_client(config: &SupabaseConfig) -> Result<Client, LessonError> {
    Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|err| LessonError::Infrastructure(format!("failed to create HTTP client: {err}")))
}

/// Adds the project key and bearer token.
pub(crate) fn authorize(request: RequestBuilder, config: &SupabaseConfig) -> RequestBuilder {
    request
        .header("apikey", &config.anon_key)
        .bearer_auth(config.bearer_token())
}

/// Turns a non-success response into an error carrying its body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("Supabase returned {status}: {body}"))
}
