//! The step sequencer.

use lessonflow_core::error::LessonError;
use lessonflow_core::step::{Step, validate_steps};

use crate::state::SequenceState;

/// What the sequencer is pointing at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor<'a> {
    /// A step is current.
    Step(&'a Step),
    /// Every step has been passed.
    Terminal,
}

impl<'a> Cursor<'a> {
    /// Returns the current step, if any.
    #[must_use]
    pub fn step(self) -> Option<&'a Step> {
        match self {
            Cursor::Step(step) => Some(step),
            Cursor::Terminal => None,
        }
    }

    /// Returns `true` once the sequence is exhausted.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Cursor::Terminal)
    }
}

/// Finite-state driver over an ordered, immutable step list.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    sequence_id: String,
    steps: Vec<Step>,
    state: SequenceState,
}

impl StepSequencer {
    /// Creates a sequencer positioned on the first step.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ContentUnavailable` if `steps` is empty or any
    /// step violates a structural invariant.
    pub fn new(sequence_id: impl Into<String>, steps: Vec<Step>) -> Result<Self, LessonError> {
        validate_steps(&steps)?;
        Ok(Self {
            sequence_id: sequence_id.into(),
            steps,
            state: SequenceState::default(),
        })
    }

    /// The lesson this sequence belongs to.
    #[must_use]
    pub fn sequence_id(&self) -> &str {
        &self.sequence_id
    }

    /// Number of steps in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`: construction rejects empty step lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The runtime cursor state.
    #[must_use]
    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    /// Returns the current step or the terminal marker.
    #[must_use]
    pub fn current(&self) -> Cursor<'_> {
        self.steps
            .get(self.state.current_index)
            .map_or(Cursor::Terminal, Cursor::Step)
    }

    /// Returns `true` once every step has been passed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.current_index >= self.steps.len()
    }

    /// Share of the sequence already passed, from 0 to 100.
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        let percent = self.state.current_index * 100 / self.steps.len().max(1);
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    /// Moves past the current step.
    ///
    /// A step with unresolved choices cannot be advanced past; the state is
    /// returned unchanged. Once terminal, repeated calls stay terminal.
    pub fn advance(&mut self) -> &SequenceState {
        let blocked = match self.current() {
            Cursor::Step(step) => step.has_choices(),
            Cursor::Terminal => true,
        };
        if !blocked {
            self.state.current_index += 1;
        }
        &self.state
    }

    /// Records `choice` for the current step and advances past it in the
    /// same operation.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::InvalidChoice` if the sequence is terminal, the
    /// current step offers no choices, or `choice` is not one of them. The
    /// state is unchanged on error.
    pub fn select_choice(&mut self, choice: &str) -> Result<&SequenceState, LessonError> {
        let step_id = match self.current() {
            Cursor::Step(step) if step.offers(choice) => step.id.clone(),
            Cursor::Step(step) => {
                return Err(LessonError::InvalidChoice {
                    step_id: step.id.clone(),
                    choice: choice.to_owned(),
                });
            }
            Cursor::Terminal => {
                return Err(LessonError::InvalidChoice {
                    step_id: "(complete)".to_owned(),
                    choice: choice.to_owned(),
                });
            }
        };

        self.state
            .recorded_choices
            .insert(step_id, choice.to_owned());
        self.state.current_index += 1;
        Ok(&self.state)
    }

    /// Returns to the first step and forgets all recorded choices.
    pub fn reset(&mut self) -> &SequenceState {
        self.state = SequenceState::default();
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_steps() -> Vec<Step> {
        vec![
            Step::message("a", "Hi").with_auto_advance(100),
            Step::choice("b", "Pick", ["X", "Y"]),
            Step::ai_action("c", "", "p"),
        ]
    }

    fn sequencer() -> StepSequencer {
        StepSequencer::new("lesson-1", sample_steps()).unwrap()
    }

    #[test]
    fn test_new_starts_on_first_step() {
        let seq = sequencer();

        assert_eq!(seq.state().current_index(), 0);
        assert_eq!(seq.current().step().map(|s| s.id.as_str()), Some("a"));
        assert!(seq.state().recorded_choices().is_empty());
        assert_eq!(seq.sequence_id(), "lesson-1");
    }

    #[test]
    fn test_new_rejects_empty_sequence() {
        let result = StepSequencer::new("lesson-1", Vec::new());

        assert!(matches!(result, Err(LessonError::ContentUnavailable(_))));
    }

    #[test]
    fn test_advance_moves_past_message_step() {
        let mut seq = sequencer();

        let state = seq.advance();

        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn test_advance_is_noop_on_choice_step() {
        // Arrange
        let mut seq = sequencer();
        seq.advance();
        let before = seq.state().clone();

        // Act
        let after = seq.advance().clone();

        // Assert
        assert_eq!(before, after);
        assert_eq!(seq.current().step().map(|s| s.id.as_str()), Some("b"));
    }

    #[test]
    fn test_select_choice_records_and_advances_together() {
        // Arrange
        let mut seq = sequencer();
        seq.advance();

        // Act
        let state = seq.select_choice("Y").unwrap().clone();

        // Assert
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.recorded_choices().get("b").map(String::as_str), Some("Y"));
        assert_eq!(state.recorded_choices().len(), 1);
    }

    #[test]
    fn test_select_choice_rejects_unknown_choice_without_mutation() {
        // Arrange
        let mut seq = sequencer();
        seq.advance();
        let before = seq.state().clone();

        // Act
        let err = seq.select_choice("Z").unwrap_err();

        // Assert
        assert_eq!(
            err,
            LessonError::InvalidChoice {
                step_id: "b".to_owned(),
                choice: "Z".to_owned(),
            }
        );
        assert_eq!(seq.state(), &before);
    }

    #[test]
    fn test_select_choice_rejects_step_without_choices() {
        let mut seq = sequencer();

        let err = seq.select_choice("X").unwrap_err();

        assert!(matches!(err, LessonError::InvalidChoice { step_id, .. } if step_id == "a"));
        assert_eq!(seq.state().current_index(), 0);
    }

    #[test]
    fn test_select_choice_rejects_when_terminal() {
        let mut seq = sequencer();
        seq.advance();
        seq.select_choice("X").unwrap();
        seq.advance();

        assert!(seq.select_choice("X").is_err());
    }

    #[test]
    fn test_advance_is_idempotent_once_terminal() {
        // Arrange
        let mut seq = sequencer();
        seq.advance();
        seq.select_choice("X").unwrap();
        seq.advance();

        // Act
        let first = seq.advance().clone();
        let second = seq.advance().clone();

        // Assert
        assert!(seq.is_terminal());
        assert!(seq.current().is_terminal());
        assert_eq!(first.current_index(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_clears_index_and_choices() {
        let mut seq = sequencer();
        seq.advance();
        seq.select_choice("X").unwrap();

        let state = seq.reset();

        assert_eq!(state, &SequenceState::default());
        assert_eq!(seq.current().step().map(|s| s.id.as_str()), Some("a"));
    }

    #[test]
    fn test_progress_percentage_tracks_index() {
        let mut seq = sequencer();
        assert_eq!(seq.progress_percentage(), 0);

        seq.advance();
        assert_eq!(seq.progress_percentage(), 33);

        seq.select_choice("Y").unwrap();
        seq.advance();
        assert_eq!(seq.progress_percentage(), 100);
    }

    #[test]
    fn test_choice_gating_holds_for_every_choice_step() {
        let steps = vec![
            Step::choice("q1", "First?", ["a", "b"]),
            Step::choice("q2", "Second?", ["c"]),
            Step::choice("q3", "Third?", ["d", "e", "f"]),
        ];
        let mut seq = StepSequencer::new("quiz", steps).unwrap();

        for (index, answer) in ["b", "c", "f"].into_iter().enumerate() {
            assert_eq!(seq.advance().current_index(), index);
            assert_eq!(seq.select_choice(answer).unwrap().current_index(), index + 1);
        }
        assert!(seq.is_terminal());
    }
}
