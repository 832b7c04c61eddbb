//! Content and progress store abstractions.

use async_trait::async_trait;

use crate::completion::CompletionRecord;
use crate::error::LessonError;
use crate::step::Step;

/// Read side of the lesson content store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Load the ordered step list for a lesson.
    async fn fetch_steps(&self, lesson_id: &str) -> Result<Vec<Step>, LessonError>;
}

/// Write side of the learner progress store.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Persist the completion of a lesson. Takes the record by value; the
    /// caller keeps no reference to it.
    async fn report_completion(&self, record: CompletionRecord) -> Result<(), LessonError>;
}
