//! Lessonflow terminal runner.
//!
//! Wires the lesson controller to a content store, a generator and a
//! progress sink chosen from the environment, and plays the lesson in a
//! terminal.

pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod progress_log;
pub mod terminal;
