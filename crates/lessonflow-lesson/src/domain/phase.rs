//! Per-step controller phases.

use std::fmt;

/// Where the controller is within the current step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LessonPhase {
    /// A step has just become current.
    #[default]
    Idle,
    /// The step's text is being typed out.
    Revealing,
    /// Waiting for the learner to pick one of the step's choices.
    AwaitingChoice,
    /// Waiting for the content generator.
    AwaitingAiResult,
    /// Waiting for the auto-advance delay or an explicit continue.
    ReadyToAdvance,
    /// The sequence is exhausted and the completion record was emitted.
    Complete,
    /// The lesson was torn down before completing.
    TornDown,
}

impl LessonPhase {
    /// Returns `true` for phases after which no transition is possible.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(self, LessonPhase::Complete | LessonPhase::TornDown)
    }
}

impl fmt::Display for LessonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LessonPhase::Idle => "idle",
            LessonPhase::Revealing => "revealing",
            LessonPhase::AwaitingChoice => "awaiting-choice",
            LessonPhase::AwaitingAiResult => "awaiting-ai-result",
            LessonPhase::ReadyToAdvance => "ready-to-advance",
            LessonPhase::Complete => "complete",
            LessonPhase::TornDown => "torn-down",
        };
        f.write_str(name)
    }
}
