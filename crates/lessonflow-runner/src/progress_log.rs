//! A `ProgressStore` that appends completion records to a JSON-lines file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lessonflow_core::completion::CompletionRecord;
use lessonflow_core::error::LessonError;
use lessonflow_core::store::ProgressStore;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Appends one JSON object per completed lesson.
#[derive(Debug, Clone)]
pub struct JsonLinesProgressStore {
    path: PathBuf,
}

impl JsonLinesProgressStore {
    /// Creates a store writing to `path`. The file is created on first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProgressStore for JsonLinesProgressStore {
    #[instrument(skip(self, record), fields(path = %self.path.display(), run_id = %record.run_id))]
    async fn report_completion(&self, record: CompletionRecord) -> Result<(), LessonError> {
        let mut line = serde_json::to_string(&record)
            .map_err(|err| LessonError::Infrastructure(err.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|err| LessonError::Infrastructure(format!("{}: {err}", self.path.display())))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|err| LessonError::Infrastructure(err.to_string()))?;
        file.flush()
            .await
            .map_err(|err| LessonError::Infrastructure(err.to_string()))?;

        info!("completion appended to progress log");
        Ok(())
    }
}
