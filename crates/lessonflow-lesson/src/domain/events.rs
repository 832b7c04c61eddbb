//! Upward notifications from the lesson controller.

use lessonflow_core::completion::CompletionRecord;
use lessonflow_core::step::Step;
use tokio::sync::mpsc;

/// Where the content shown on an `ai-action` step came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentSource {
    /// The content generator answered in time.
    Generated,
    /// The generator failed; the step's fallback content was substituted.
    Fallback,
}

/// Receives synchronous notifications from a running lesson, in step order.
///
/// Every method defaults to doing nothing. Implementations must not block:
/// reveal ticks are delivered from the reveal timer.
pub trait LessonObserver: Send + Sync {
    /// A new step became current.
    fn on_step_changed(&self, _step: &Step) {}

    /// The revealed prefix of the current step's text grew.
    fn on_reveal_tick(&self, _revealed_prefix: &str) {}

    /// The current step waits for one of `choices`.
    fn on_awaiting_choice(&self, _step_id: &str, _choices: &[String]) {}

    /// The current step waits for an explicit continue.
    fn on_awaiting_continue(&self, _step_id: &str) {}

    /// An `ai-action` step produced its content.
    fn on_generated_content(&self, _step_id: &str, _content: &str, _source: ContentSource) {}

    /// The lesson went back to its first step.
    fn on_restarted(&self) {}

    /// The lesson finished.
    fn on_complete(&self, _record: &CompletionRecord) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LessonObserver for NoopObserver {}

/// Owned form of a `LessonObserver` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonEvent {
    /// See [`LessonObserver::on_step_changed`].
    StepChanged(Step),
    /// See [`LessonObserver::on_reveal_tick`].
    RevealTick(String),
    /// See [`LessonObserver::on_awaiting_choice`].
    AwaitingChoice {
        /// The choice step.
        step_id: String,
        /// Options in display order.
        choices: Vec<String>,
    },
    /// See [`LessonObserver::on_awaiting_continue`].
    AwaitingContinue {
        /// The step waiting to be continued.
        step_id: String,
    },
    /// See [`LessonObserver::on_generated_content`].
    GeneratedContent {
        /// The `ai-action` step.
        step_id: String,
        /// Text to display.
        content: String,
        /// Generated or fallback.
        source: ContentSource,
    },
    /// See [`LessonObserver::on_restarted`].
    Restarted,
    /// See [`LessonObserver::on_complete`].
    Completed(CompletionRecord),
}

/// Forwards notifications as [`LessonEvent`]s over an unbounded channel.
///
/// Sends never block; events are dropped silently once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<LessonEvent>,
}

impl ChannelObserver {
    /// Creates the observer and the receiving end of its event stream.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LessonEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: LessonEvent) {
        let _ = self.tx.send(event);
    }
}

impl LessonObserver for ChannelObserver {
    fn on_step_changed(&self, step: &Step) {
        self.emit(LessonEvent::StepChanged(step.clone()));
    }

    fn on_reveal_tick(&self, revealed_prefix: &str) {
        self.emit(LessonEvent::RevealTick(revealed_prefix.to_owned()));
    }

    fn on_awaiting_choice(&self, step_id: &str, choices: &[String]) {
        self.emit(LessonEvent::AwaitingChoice {
            step_id: step_id.to_owned(),
            choices: choices.to_vec(),
        });
    }

    fn on_awaiting_continue(&self, step_id: &str) {
        self.emit(LessonEvent::AwaitingContinue {
            step_id: step_id.to_owned(),
        });
    }

    fn on_generated_content(&self, step_id: &str, content: &str, source: ContentSource) {
        self.emit(LessonEvent::GeneratedContent {
            step_id: step_id.to_owned(),
            content: content.to_owned(),
            source,
        });
    }

    fn on_restarted(&self) {
        self.emit(LessonEvent::Restarted);
    }

    fn on_complete(&self, record: &CompletionRecord) {
        self.emit(LessonEvent::Completed(record.clone()));
    }
}
