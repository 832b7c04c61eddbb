//! Connection settings for a Supabase project.

use std::time::Duration;

/// Default character voice for generated content.
pub const DEFAULT_CHARACTER_TYPE: &str = "maya";

/// Default kind of generated content.
pub const DEFAULT_CONTENT_TYPE: &str = "lesson_content";

/// Connection settings shared by every adapter in this crate.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Public anon key, sent as the `apikey` header.
    pub anon_key: String,
    /// Signed-in user's JWT. Falls back to the anon key when absent.
    pub access_token: Option<String>,
    /// Learner whose progress is recorded.
    pub user_id: Option<String>,
    /// `characterType` passed to the generation function.
    pub character_type: String,
    /// `contentType` passed to the generation function.
    pub content_type: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl SupabaseConfig {
    /// Creates a config with the default character, content type and a 15
    /// second request timeout.
    #[must_use]
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            access_token: None,
            user_id: None,
            character_type: DEFAULT_CHARACTER_TYPE.to_owned(),
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
            request_timeout: Duration::from_secs(15),
        }
    }

    /// Joins `path` onto the project URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// The bearer token for the `Authorization` header.
    #[must_use]
    pub fn bearer_token(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }
}
