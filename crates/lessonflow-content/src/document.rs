//! The YAML lesson document.

use lessonflow_core::error::LessonError;
use lessonflow_core::step::{Step, validate_steps};
use serde::{Deserialize, Serialize};

/// One authored lesson.
///
/// ```yaml
/// id: email-basics
/// title: Writing a first email
/// steps:
///   - id: intro
///     kind: message
///     text: Hi, I'm Maya.
///     auto_advance_delay_ms: 1500
///   - id: tone
///     kind: choice
///     text: How formal should it be?
///     choices: [Formal, Friendly]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDocument {
    /// Lesson identifier; matches the file stem in a [`crate::FileContentStore`].
    pub id: String,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Steps in play order.
    pub steps: Vec<Step>,
}

impl LessonDocument {
    /// Parses a lesson document and checks it.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ContentUnavailable` if the YAML is malformed or
    /// the document fails [`LessonDocument::validate`].
    pub fn from_yaml_str(source: &str) -> Result<Self, LessonError> {
        let document: Self = serde_yaml::from_str(source)
            .map_err(|err| LessonError::ContentUnavailable(format!("malformed lesson: {err}")))?;
        document.validate()?;
        Ok(document)
    }

    /// Checks the lesson id and the structural invariants of its steps.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ContentUnavailable` describing the first
    /// violation.
    pub fn validate(&self) -> Result<(), LessonError> {
        if self.id.trim().is_empty() {
            return Err(LessonError::ContentUnavailable(
                "lesson id must not be empty".to_owned(),
            ));
        }
        validate_steps(&self.steps)
            .map_err(|err| match err {
                LessonError::ContentUnavailable(reason) => {
                    LessonError::ContentUnavailable(format!("lesson {:?}: {reason}", self.id))
                }
                other => other,
            })
    }

    /// Serializes the document back to YAML.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Infrastructure` if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, LessonError> {
        serde_yaml::to_string(self).map_err(|err| LessonError::Infrastructure(err.to_string()))
    }
}
