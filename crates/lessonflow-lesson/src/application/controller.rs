//! The guided lesson controller.
//!
//! One controller drives one lesson play-through. It owns its sequencer and
//! revealer, runs on the tokio scheduler, and is steered through a
//! [`LessonHandle`]. Choice and continue input is queued and only consumed
//! once the current step is ready for it, so a step's generation call always
//! resolves before the next step begins.

use std::sync::Arc;

use lessonflow_core::clock::Clock;
use lessonflow_core::completion::CompletionRecord;
use lessonflow_core::error::LessonError;
use lessonflow_core::generation::{ContentGenerator, GenerationError};
use lessonflow_core::step::{Step, StepKind};
use lessonflow_core::store::{ContentStore, ProgressStore};
use lessonflow_reveal::TypedRevealer;
use lessonflow_sequencing::{Cursor, StepSequencer};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::handle::{ControlCommand, InputCommand, LessonHandle};
use crate::domain::config::FlowConfig;
use crate::domain::events::{ContentSource, LessonObserver};
use crate::domain::phase::LessonPhase;

/// External collaborators a lesson needs.
#[derive(Clone)]
pub struct Collaborators {
    /// Source of lesson steps.
    pub content: Arc<dyn ContentStore>,
    /// Content generation service for `ai-action` steps.
    pub generator: Arc<dyn ContentGenerator>,
    /// Destination of the completion record.
    pub progress: Arc<dyn ProgressStore>,
    /// Wall-clock time for the completion timestamp.
    pub clock: Arc<dyn Clock>,
}

/// How a lesson run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonOutcome {
    /// Every step was passed; the record was emitted and reported.
    Completed(CompletionRecord),
    /// The lesson was torn down first.
    TornDown {
        /// The step that was current at teardown.
        step_id: Option<String>,
    },
}

/// Why a step was abandoned before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Restart,
    Teardown,
}

/// Maps a control command received outside a reveal to an interrupt.
fn interrupt_for(command: Option<ControlCommand>) -> Option<Interrupt> {
    match command {
        Some(ControlCommand::SkipReveal) => None,
        Some(ControlCommand::Restart) => Some(Interrupt::Restart),
        Some(ControlCommand::Teardown) | None => Some(Interrupt::Teardown),
    }
}

/// Drives a guided lesson from its first step to completion.
pub struct GuidedLessonController {
    run_id: Uuid,
    sequencer: StepSequencer,
    revealer: TypedRevealer,
    generator: Arc<dyn ContentGenerator>,
    progress: Arc<dyn ProgressStore>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn LessonObserver>,
    config: FlowConfig,
    control_rx: mpsc::UnboundedReceiver<ControlCommand>,
    input_rx: mpsc::UnboundedReceiver<InputCommand>,
    phase_tx: watch::Sender<LessonPhase>,
    started_at: Instant,
    steps_advanced: usize,
    ai_content_used: bool,
}

impl GuidedLessonController {
    /// Fetches the lesson's steps and prepares a controller for them.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ContentUnavailable` if the fetch fails, yields
    /// no steps, or yields malformed steps. No sequence is started.
    #[instrument(skip(collaborators, observer, config))]
    pub async fn load(
        lesson_id: &str,
        collaborators: Collaborators,
        observer: Arc<dyn LessonObserver>,
        config: FlowConfig,
    ) -> Result<(Self, LessonHandle), LessonError> {
        let steps = collaborators
            .content
            .fetch_steps(lesson_id)
            .await
            .map_err(|err| match err {
                LessonError::ContentUnavailable(reason) => LessonError::ContentUnavailable(reason),
                other => LessonError::ContentUnavailable(other.to_string()),
            })?;
        info!(steps = steps.len(), "lesson content loaded");
        Self::from_steps(lesson_id, steps, collaborators, observer, config)
    }

    /// Prepares a controller for an already fetched step list.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ContentUnavailable` if `steps` is empty or
    /// malformed.
    pub fn from_steps(
        lesson_id: &str,
        steps: Vec<Step>,
        collaborators: Collaborators,
        observer: Arc<dyn LessonObserver>,
        config: FlowConfig,
    ) -> Result<(Self, LessonHandle), LessonError> {
        let sequencer = StepSequencer::new(lesson_id, steps)?;
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (phase_tx, phase_rx) = watch::channel(LessonPhase::Idle);

        let controller = Self {
            run_id: Uuid::new_v4(),
            sequencer,
            revealer: TypedRevealer::new(config.reveal),
            generator: collaborators.generator,
            progress: collaborators.progress,
            clock: collaborators.clock,
            observer,
            config,
            control_rx,
            input_rx,
            phase_tx,
            started_at: Instant::now(),
            steps_advanced: 0,
            ai_content_used: false,
        };
        Ok((controller, LessonHandle::new(control_tx, input_tx, phase_rx)))
    }

    /// Identifies this play-through in logs and in the completion record.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Plays the lesson until it completes or is torn down.
    #[instrument(
        skip(self),
        fields(run_id = %self.run_id, lesson_id = %self.sequencer.sequence_id())
    )]
    pub async fn run(mut self) -> LessonOutcome {
        self.started_at = Instant::now();
        info!(steps = self.sequencer.len(), "lesson started");

        loop {
            let step = match self.sequencer.current() {
                Cursor::Step(step) => step.clone(),
                Cursor::Terminal => return self.complete().await,
            };

            match self.play_step(&step).await {
                Ok(()) => {}
                Err(Interrupt::Restart) => self.restart(),
                Err(Interrupt::Teardown) => {
                    self.set_phase(LessonPhase::TornDown);
                    info!(step_id = %step.id, "lesson torn down");
                    return LessonOutcome::TornDown {
                        step_id: Some(step.id),
                    };
                }
            }
        }
    }

    async fn play_step(&mut self, step: &Step) -> Result<(), Interrupt> {
        self.set_phase(LessonPhase::Idle);
        debug!(step_id = %step.id, kind = ?step.kind, "step entered");
        self.observer.on_step_changed(step);

        let silent_generation = step.kind == StepKind::AiAction && step.text.is_empty();
        if !silent_generation {
            self.reveal(&step.text).await?;
        }
        if step.kind == StepKind::AiAction {
            self.generate(step).await?;
        }
        if step.has_choices() {
            self.await_choice(step).await
        } else {
            self.await_advance(step).await
        }
    }

    async fn reveal(&mut self, text: &str) -> Result<(), Interrupt> {
        self.set_phase(LessonPhase::Revealing);

        let observer = Arc::clone(&self.observer);
        let (done_tx, mut done_rx) = oneshot::channel();
        let handle = self.revealer.start(
            text,
            move |prefix| observer.on_reveal_tick(prefix),
            move || {
                let _ = done_tx.send(());
            },
        );

        loop {
            tokio::select! {
                _ = &mut done_rx => return Ok(()),
                command = self.control_rx.recv() => match command {
                    Some(ControlCommand::SkipReveal) => {
                        self.revealer.finish(&handle);
                    }
                    other => {
                        if let Some(interrupt) = interrupt_for(other) {
                            self.revealer.cancel(&handle);
                            return Err(interrupt);
                        }
                    }
                },
            }
        }
    }

    async fn generate(&mut self, step: &Step) -> Result<(), Interrupt> {
        self.set_phase(LessonPhase::AwaitingAiResult);

        let generator = Arc::clone(&self.generator);
        let prompt = step.ai_prompt.clone().unwrap_or_default();
        let timeout = self.config.generation_timeout;
        let call = async move {
            match tokio::time::timeout(timeout, generator.generate(&prompt)).await {
                Ok(result) => result,
                Err(_) => Err(GenerationError::TimedOut(timeout)),
            }
        };
        tokio::pin!(call);

        let result = loop {
            tokio::select! {
                result = &mut call => break result,
                command = self.control_rx.recv() => {
                    if let Some(interrupt) = interrupt_for(command) {
                        debug!(step_id = %step.id, "discarding in-flight generation");
                        return Err(interrupt);
                    }
                }
            }
        };

        let (content, source) = match result {
            Ok(content) if !content.trim().is_empty() => (content, ContentSource::Generated),
            Ok(_) => {
                warn!(step_id = %step.id, "generation returned empty content, using fallback");
                (self.fallback_for(step), ContentSource::Fallback)
            }
            Err(err) => {
                warn!(step_id = %step.id, error = %err, "generation failed, using fallback");
                (self.fallback_for(step), ContentSource::Fallback)
            }
        };

        self.ai_content_used = true;
        self.observer
            .on_generated_content(&step.id, &content, source);
        Ok(())
    }

    fn fallback_for(&self, step: &Step) -> String {
        step.fallback_content
            .clone()
            .unwrap_or_else(|| self.config.default_fallback.clone())
    }

    async fn await_choice(&mut self, step: &Step) -> Result<(), Interrupt> {
        self.set_phase(LessonPhase::AwaitingChoice);
        self.observer.on_awaiting_choice(&step.id, &step.choices);

        loop {
            tokio::select! {
                command = self.control_rx.recv() => {
                    if let Some(interrupt) = interrupt_for(command) {
                        return Err(interrupt);
                    }
                }
                input = self.input_rx.recv() => match input {
                    Some(InputCommand::SelectChoice { choice, reply }) => {
                        let verdict = self.sequencer.select_choice(&choice).map(|_| ());
                        let accepted = verdict.is_ok();
                        match &verdict {
                            Ok(()) => info!(step_id = %step.id, %choice, "choice selected"),
                            Err(err) => warn!(step_id = %step.id, error = %err, "choice rejected"),
                        }
                        let _ = reply.send(verdict);
                        if accepted {
                            self.steps_advanced += 1;
                            return Ok(());
                        }
                    }
                    Some(InputCommand::Continue) => {
                        debug!(step_id = %step.id, "continue ignored while awaiting a choice");
                    }
                    None => return Err(Interrupt::Teardown),
                },
            }
        }
    }

    async fn await_advance(&mut self, step: &Step) -> Result<(), Interrupt> {
        self.set_phase(LessonPhase::ReadyToAdvance);

        let deadline = match step.auto_advance_delay() {
            Some(delay) => Some(Instant::now() + delay),
            None if step.wait_for_continue => {
                self.observer.on_awaiting_continue(&step.id);
                None
            }
            None => {
                debug!(step_id = %step.id, "advancing without delay");
                self.sequencer.advance();
                self.steps_advanced += 1;
                return Ok(());
            }
        };
        let timer = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(timer);

        loop {
            tokio::select! {
                () = &mut timer => break,
                command = self.control_rx.recv() => {
                    if let Some(interrupt) = interrupt_for(command) {
                        return Err(interrupt);
                    }
                }
                input = self.input_rx.recv() => match input {
                    Some(InputCommand::Continue) => break,
                    Some(InputCommand::SelectChoice { choice, reply }) => {
                        let verdict = self.sequencer.select_choice(&choice).map(|_| ());
                        let _ = reply.send(verdict);
                    }
                    None => return Err(Interrupt::Teardown),
                },
            }
        }

        self.sequencer.advance();
        self.steps_advanced += 1;
        Ok(())
    }

    fn restart(&mut self) {
        self.sequencer.reset();
        self.steps_advanced = 0;
        self.ai_content_used = false;
        self.started_at = Instant::now();

        let first_step = self
            .sequencer
            .current()
            .step()
            .map(|step| step.id.clone())
            .unwrap_or_default();
        while let Ok(input) = self.input_rx.try_recv() {
            if let InputCommand::SelectChoice { choice, reply } = input {
                let _ = reply.send(Err(LessonError::InvalidChoice {
                    step_id: first_step.clone(),
                    choice,
                }));
            }
        }

        info!("lesson restarted");
        self.observer.on_restarted();
    }

    async fn complete(self) -> LessonOutcome {
        self.set_phase(LessonPhase::Complete);

        let elapsed_ms = u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        let record = CompletionRecord {
            run_id: self.run_id,
            sequence_id: self.sequencer.sequence_id().to_owned(),
            elapsed_ms,
            choices: self.sequencer.state().recorded_choices().clone(),
            ai_content_used: self.ai_content_used,
            steps_completed: self.steps_advanced,
            completed_at: self.clock.now(),
        };
        info!(
            elapsed_ms,
            steps = record.steps_completed,
            ai_content_used = record.ai_content_used,
            "lesson completed"
        );

        self.observer.on_complete(&record);
        if let Err(err) = self.progress.report_completion(record.clone()).await {
            warn!(error = %err, "failed to report lesson completion");
        }
        LessonOutcome::Completed(record)
    }

    fn set_phase(&self, phase: LessonPhase) {
        let previous = self.phase_tx.send_replace(phase);
        if previous != phase {
            debug!(from = %previous, to = %phase, "phase changed");
        }
    }
}
