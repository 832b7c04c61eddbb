//! Lessonflow — Typed Reveal.
//!
//! Paces the display of a string one character at a time on the tokio
//! scheduler, with a cancelable handle per reveal.

pub mod revealer;
pub mod state;

pub use revealer::{RevealConfig, RevealHandle, TypedRevealer};
pub use state::RevealState;
