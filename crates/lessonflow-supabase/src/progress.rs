//! Completion records upserted into the `lesson_progress` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lessonflow_core::completion::CompletionRecord;
use lessonflow_core::error::LessonError;
use lessonflow_core::store::ProgressStore;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, instrument};

use crate::client::{authorize, build_client, ensure_success};
use crate::config::SupabaseConfig;
use crate::content::parse_lesson_id;

/// The row written for a completed lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonProgressRow {
    /// Learner id.
    pub user_id: String,
    /// Hosted lesson id.
    pub lesson_id: i64,
    /// Always `true`: only completions are reported.
    pub completed: bool,
    /// Always 100.
    pub progress_percentage: u8,
    /// When the lesson was completed.
    pub last_accessed: DateTime<Utc>,
}

impl LessonProgressRow {
    /// Builds the row for `record`.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ContentUnavailable` if the record's sequence id is
    /// not a hosted lesson id.
    pub fn for_completion(user_id: &str, record: &CompletionRecord) -> Result<Self, LessonError> {
        Ok(Self {
            user_id: user_id.to_owned(),
            lesson_id: parse_lesson_id(&record.sequence_id)?,
            completed: true,
            progress_percentage: 100,
            last_accessed: record.completed_at,
        })
    }
}

/// Reports completions to the hosted `lesson_progress` table.
#[derive(Debug, Clone)]
pub struct SupabaseProgressStore {
    config: SupabaseConfig,
    user_id: String,
    http_client: Client,
}

impl SupabaseProgressStore {
    /// Creates the store.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Infrastructure` if `config.user_id` is missing or
    /// the HTTP client cannot be built.
    pub fn new(config: SupabaseConfig) -> Result<Self, LessonError> {
        let user_id = config.user_id.clone().ok_or_else(|| {
            LessonError::Infrastructure("progress reporting requires a user id".to_owned())
        })?;
        let http_client = build_client(&config)?;
        Ok(Self {
            config,
            user_id,
            http_client,
        })
    }

    fn upsert_url(&self) -> String {
        format!(
            "{}?on_conflict=user_id,lesson_id",
            self.config.endpoint("rest/v1/lesson_progress")
        )
    }
}

#[async_trait]
impl ProgressStore for SupabaseProgressStore {
    #[instrument(skip(self, record), fields(run_id = %record.run_id, lesson_id = %record.sequence_id))]
    async fn report_completion(&self, record: CompletionRecord) -> Result<(), LessonError> {
        let row = LessonProgressRow::for_completion(&self.user_id, &record)?;
        let request = self
            .http_client
            .post(self.upsert_url())
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row);
        let response = authorize(request, &self.config)
            .send()
            .await
            .map_err(|err| LessonError::Infrastructure(err.to_string()))?;
        ensure_success(response)
            .await
            .map_err(LessonError::Infrastructure)?;

        info!("lesson progress recorded");
        Ok(())
    }
}
