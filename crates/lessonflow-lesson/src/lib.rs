//! Lessonflow — Guided Lesson orchestration.
//!
//! Drives a lesson from its first step to completion: paces each message
//! through the typed revealer, gates on learner choices, calls the content
//! generator once per `ai-action` step (falling back to canned content on any
//! failure), and reports a single completion record.

pub mod application;
pub mod domain;

pub use application::controller::{Collaborators, GuidedLessonController, LessonOutcome};
pub use application::handle::LessonHandle;
pub use domain::config::FlowConfig;
pub use domain::events::{ChannelObserver, ContentSource, LessonEvent, LessonObserver, NoopObserver};
pub use domain::phase::LessonPhase;
