//! Lessonflow terminal runner entry point.

use std::error::Error;
use std::sync::Arc;

use lessonflow_lesson::{GuidedLessonController, LessonOutcome};
use lessonflow_runner::app::build_collaborators;
use lessonflow_runner::config::RunnerConfig;
use lessonflow_runner::error::AppError;
use lessonflow_runner::input;
use lessonflow_runner::terminal::TerminalObserver;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr; stdout carries the lesson.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = RunnerConfig::from_env(std::env::args().nth(1))?;
    tracing::info!(lesson_id = %config.lesson_id, "Starting lessonflow runner");

    let collaborators = build_collaborators(&config)?;
    let observer = Arc::new(TerminalObserver::new(std::io::stdout()));
    let (controller, handle) = GuidedLessonController::load(
        &config.lesson_id,
        collaborators,
        observer.clone(),
        config.flow.clone(),
    )
    .await
    .map_err(AppError::from)?;

    let run = tokio::spawn(controller.run());
    let input = tokio::spawn(input::drive(handle, observer, input::spawn_stdin_reader()));

    let outcome = run.await.map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    input.abort();

    match outcome {
        LessonOutcome::Completed(record) => {
            tracing::info!(run_id = %record.run_id, "Lesson completed");
        }
        LessonOutcome::TornDown { step_id } => {
            tracing::info!(step_id = ?step_id, "Lesson stopped before completion");
        }
    }
    Ok(())
}
