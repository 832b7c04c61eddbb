//! Runtime cursor state over a step list.

use std::collections::BTreeMap;

/// Position within a sequence plus the choices made so far.
///
/// `current_index` ranges over `0..=len`; `len` is the terminal position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceState {
    pub(crate) current_index: usize,
    pub(crate) recorded_choices: BTreeMap<String, String>,
}

impl SequenceState {
    /// Index of the current step, or the sequence length once terminal.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Choice made on each resolved choice step, keyed by step id.
    #[must_use]
    pub fn recorded_choices(&self) -> &BTreeMap<String, String> {
        &self.recorded_choices
    }
}
