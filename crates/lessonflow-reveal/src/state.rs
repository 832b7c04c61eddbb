//! Runtime state of a single reveal.

use tokio::task::AbortHandle;

/// Progress of one typewriter reveal.
///
/// Lengths are counted in Unicode scalar values. The timer handle is owned
/// exclusively by this state and is cleared on completion or cancellation.
#[derive(Debug)]
pub struct RevealState {
    source_text: String,
    /// Byte offset of each character boundary; `boundaries[k]` ends the
    /// prefix of `k` characters.
    boundaries: Vec<usize>,
    revealed_length: usize,
    timer: Option<AbortHandle>,
}

impl RevealState {
    /// Creates a reveal positioned before the first character.
    #[must_use]
    pub fn new(source_text: impl Into<String>) -> Self {
        let source_text = source_text.into();
        let boundaries = std::iter::once(0)
            .chain(source_text.char_indices().map(|(i, c)| i + c.len_utf8()))
            .collect();
        Self {
            source_text,
            boundaries,
            revealed_length: 0,
            timer: None,
        }
    }

    /// The full string being revealed.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Number of characters revealed so far.
    #[must_use]
    pub fn revealed_length(&self) -> usize {
        self.revealed_length
    }

    /// Length of the source text in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// The revealed prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.source_text[..self.boundaries[self.revealed_length]]
    }

    /// Returns `true` once the whole text is revealed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.revealed_length == self.char_len()
    }

    pub(crate) fn step_forward(&mut self) {
        if !self.is_complete() {
            self.revealed_length += 1;
        }
    }

    pub(crate) fn reveal_all(&mut self) {
        self.revealed_length = self.char_len();
    }

    pub(crate) fn attach_timer(&mut self, timer: AbortHandle) {
        self.stop_timer();
        self.timer = Some(timer);
    }

    /// Aborts and clears the timer, if one is attached.
    pub(crate) fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Clears the timer without aborting it (the timer task is finishing on
    /// its own).
    pub(crate) fn release_timer(&mut self) {
        self.timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_grows_by_character() {
        let mut state = RevealState::new("Hi");

        assert_eq!(state.prefix(), "");
        state.step_forward();
        assert_eq!(state.prefix(), "H");
        state.step_forward();
        assert_eq!(state.prefix(), "Hi");
        assert!(state.is_complete());
    }

    #[test]
    fn test_prefix_respects_multibyte_boundaries() {
        let mut state = RevealState::new("né✓");

        assert_eq!(state.char_len(), 3);
        state.step_forward();
        state.step_forward();
        assert_eq!(state.prefix(), "né");
        state.reveal_all();
        assert_eq!(state.prefix(), "né✓");
    }

    #[test]
    fn test_empty_text_is_complete_immediately() {
        let state = RevealState::new("");

        assert!(state.is_complete());
        assert_eq!(state.prefix(), "");
    }

    #[test]
    fn test_step_forward_saturates_at_end() {
        let mut state = RevealState::new("a");
        state.step_forward();
        state.step_forward();

        assert_eq!(state.revealed_length(), 1);
    }
}
