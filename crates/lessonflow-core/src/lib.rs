//! Lessonflow Core — shared domain vocabulary.
//!
//! This crate defines the step model, the error taxonomy, and the traits for
//! the external collaborators (content store, progress store, content
//! generator) that every other crate depends on. It contains no
//! infrastructure code.

pub mod clock;
pub mod completion;
pub mod error;
pub mod generation;
pub mod step;
pub mod store;
