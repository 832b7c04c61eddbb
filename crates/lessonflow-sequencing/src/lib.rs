//! Lessonflow — Step Sequencing.
//!
//! Pure, synchronous cursor over an immutable list of lesson steps: which
//! step is current, which choices have been made, and when the sequence is
//! exhausted.

pub mod sequencer;
pub mod state;

pub use sequencer::{Cursor, StepSequencer};
pub use state::SequenceState;
