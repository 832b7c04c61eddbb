//! Lesson domain types: configuration, phases, and observer events.

pub mod config;
pub mod events;
pub mod phase;
