//! A `ContentStore` backed by a directory of YAML lesson documents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lessonflow_core::error::LessonError;
use lessonflow_core::step::Step;
use lessonflow_core::store::ContentStore;
use tracing::{debug, instrument};

use crate::document::LessonDocument;

/// Serves lessons from `<root>/<lesson_id>.yaml`.
#[derive(Debug, Clone)]
pub struct FileContentStore {
    root: PathBuf,
}

impl FileContentStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory lessons are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the document path for `lesson_id`.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ContentUnavailable` if the id is empty or looks
    /// like a path rather than a plain name.
    pub fn lesson_path(&self, lesson_id: &str) -> Result<PathBuf, LessonError> {
        let path_like = lesson_id.is_empty()
            || lesson_id.starts_with('.')
            || lesson_id.contains(['/', '\\', ':'])
            || lesson_id.contains("..");
        if path_like {
            return Err(LessonError::ContentUnavailable(format!(
                "invalid lesson id {lesson_id:?}"
            )));
        }
        Ok(self.root.join(format!("{lesson_id}.yaml")))
    }

    /// Reads and validates the whole document for `lesson_id`.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ContentUnavailable` if the lesson does not exist
    /// or is malformed, and `LessonError::Infrastructure` on other I/O
    /// failures.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn load_document(&self, lesson_id: &str) -> Result<LessonDocument, LessonError> {
        let path = self.lesson_path(lesson_id)?;
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => {
                    LessonError::ContentUnavailable(format!("lesson {lesson_id:?} not found"))
                }
                _ => LessonError::Infrastructure(format!("{}: {err}", path.display())),
            })?;

        let document = LessonDocument::from_yaml_str(&source)?;
        if document.id != lesson_id {
            return Err(LessonError::ContentUnavailable(format!(
                "{} declares lesson id {:?}",
                path.display(),
                document.id
            )));
        }
        debug!(steps = document.steps.len(), "lesson document loaded");
        Ok(document)
    }
}

#[async_trait]
impl ContentStore for FileContentStore {
    async fn fetch_steps(&self, lesson_id: &str) -> Result<Vec<Step>, LessonError> {
        Ok(self.load_document(lesson_id).await?.steps)
    }
}
