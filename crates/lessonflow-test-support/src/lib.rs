//! Shared test doubles for the lessonflow workspace.

mod clock;
mod content;
mod generator;
mod progress;

pub use clock::FixedClock;
pub use content::{FailingContentStore, StaticContentStore};
pub use generator::{FailingGenerator, GatedGenerator, HangingGenerator, ScriptedGenerator};
pub use progress::{FailingProgressStore, RecordingProgressStore};
