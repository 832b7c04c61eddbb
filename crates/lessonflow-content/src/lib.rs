//! Lessonflow — Content Authoring.
//!
//! Lessons are authored as YAML documents, one file per lesson, and served to
//! the lesson controller through [`FileContentStore`].

pub mod document;
pub mod file_store;

pub use document::LessonDocument;
pub use file_store::FileContentStore;
