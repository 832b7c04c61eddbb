//! Test content stores — canned `ContentStore` implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use lessonflow_core::error::LessonError;
use lessonflow_core::step::Step;
use lessonflow_core::store::ContentStore;

/// A content store that returns the same step list for every lesson id and
/// records which ids were requested.
#[derive(Debug)]
pub struct StaticContentStore {
    steps: Vec<Step>,
    requested: Mutex<Vec<String>>,
}

impl StaticContentStore {
    /// Create a store that serves `steps`.
    #[must_use]
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Returns the lesson ids requested so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requested_ids(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentStore for StaticContentStore {
    async fn fetch_steps(&self, lesson_id: &str) -> Result<Vec<Step>, LessonError> {
        self.requested.lock().unwrap().push(lesson_id.to_owned());
        Ok(self.steps.clone())
    }
}

/// A content store that always fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingContentStore;

#[async_trait]
impl ContentStore for FailingContentStore {
    async fn fetch_steps(&self, _lesson_id: &str) -> Result<Vec<Step>, LessonError> {
        Err(LessonError::Infrastructure("connection refused".into()))
    }
}
