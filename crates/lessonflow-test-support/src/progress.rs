//! Test progress stores — mock `ProgressStore` implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use lessonflow_core::completion::CompletionRecord;
use lessonflow_core::error::LessonError;
use lessonflow_core::store::ProgressStore;

/// A progress store that records every completion it receives and always
/// succeeds.
#[derive(Debug, Default)]
pub struct RecordingProgressStore {
    records: Mutex<Vec<CompletionRecord>>,
}

impl RecordingProgressStore {
    /// Create an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all reported records.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn records(&self) -> Vec<CompletionRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressStore for RecordingProgressStore {
    async fn report_completion(&self, record: CompletionRecord) -> Result<(), LessonError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

/// A progress store that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingProgressStore;

#[async_trait]
impl ProgressStore for FailingProgressStore {
    async fn report_completion(&self, _record: CompletionRecord) -> Result<(), LessonError> {
        Err(LessonError::Infrastructure("connection refused".into()))
    }
}
