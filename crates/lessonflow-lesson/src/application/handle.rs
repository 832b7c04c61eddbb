//! The handle used by presentation layers to steer a running lesson.

use lessonflow_core::error::LessonError;
use tokio::sync::{mpsc, oneshot, watch};

use crate::domain::phase::LessonPhase;

/// Commands honored in every phase.
#[derive(Debug)]
pub(crate) enum ControlCommand {
    SkipReveal,
    Restart,
    Teardown,
}

/// Learner input, queued until the current step is ready for it.
#[derive(Debug)]
pub(crate) enum InputCommand {
    SelectChoice {
        choice: String,
        reply: oneshot::Sender<Result<(), LessonError>>,
    },
    Continue,
}

/// Cloneable handle to a running `GuidedLessonController`.
///
/// Dropping every handle tears the lesson down.
#[derive(Debug, Clone)]
pub struct LessonHandle {
    control_tx: mpsc::UnboundedSender<ControlCommand>,
    input_tx: mpsc::UnboundedSender<InputCommand>,
    phase_rx: watch::Receiver<LessonPhase>,
}

impl LessonHandle {
    pub(crate) fn new(
        control_tx: mpsc::UnboundedSender<ControlCommand>,
        input_tx: mpsc::UnboundedSender<InputCommand>,
        phase_rx: watch::Receiver<LessonPhase>,
    ) -> Self {
        Self {
            control_tx,
            input_tx,
            phase_rx,
        }
    }

    /// Selects `choice` on the current choice step and waits for the
    /// controller's verdict. If the step is still revealing, the selection is
    /// applied once the reveal completes.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::InvalidChoice` if the current step does not
    /// offer `choice`, and `LessonError::ControllerClosed` if the lesson has
    /// stopped.
    pub async fn select_choice(&self, choice: impl Into<String>) -> Result<(), LessonError> {
        let (reply, verdict) = oneshot::channel();
        self.input_tx
            .send(InputCommand::SelectChoice {
                choice: choice.into(),
                reply,
            })
            .map_err(|_| LessonError::ControllerClosed)?;
        verdict.await.map_err(|_| LessonError::ControllerClosed)?
    }

    /// Advances a step that waits for an explicit continue, or cuts short a
    /// pending auto-advance delay.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ControllerClosed` if the lesson has stopped.
    pub fn continue_lesson(&self) -> Result<(), LessonError> {
        self.input_tx
            .send(InputCommand::Continue)
            .map_err(|_| LessonError::ControllerClosed)
    }

    /// Shows the current step's full text immediately.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ControllerClosed` if the lesson has stopped.
    pub fn skip_reveal(&self) -> Result<(), LessonError> {
        self.control(ControlCommand::SkipReveal)
    }

    /// Returns the lesson to its first step and forgets recorded choices.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ControllerClosed` if the lesson has stopped.
    pub fn restart(&self) -> Result<(), LessonError> {
        self.control(ControlCommand::Restart)
    }

    /// Stops the lesson without emitting a completion record. No-op if the
    /// lesson has already stopped.
    pub fn teardown(&self) {
        let _ = self.control(ControlCommand::Teardown);
    }

    /// The controller's current phase.
    #[must_use]
    pub fn phase(&self) -> LessonPhase {
        *self.phase_rx.borrow()
    }

    /// A receiver that observes every phase change.
    #[must_use]
    pub fn phase_changes(&self) -> watch::Receiver<LessonPhase> {
        self.phase_rx.clone()
    }

    fn control(&self, command: ControlCommand) -> Result<(), LessonError> {
        self.control_tx
            .send(command)
            .map_err(|_| LessonError::ControllerClosed)
    }
}
