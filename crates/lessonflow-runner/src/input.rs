//! Learner input from the terminal.

use std::io::{BufRead, Write};
use std::sync::Arc;

use lessonflow_core::error::LessonError;
use lessonflow_lesson::{LessonHandle, LessonPhase};
use tokio::sync::mpsc;
use tracing::debug;

use crate::terminal::TerminalObserver;

/// One line of learner input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pick one of the offered choices.
    Choose(String),
    /// A bare Enter: skip the reveal or continue, depending on the phase.
    Enter,
    /// `s`: show the full text now.
    Skip,
    /// `r`: start the lesson over.
    Restart,
    /// `q`: stop the lesson.
    Quit,
    /// Anything else.
    Unknown(String),
}

/// Interprets `line` against the choices currently on offer. Choices may be
/// picked by number or by their label, case-insensitively.
#[must_use]
pub fn parse_command(line: &str, choices: &[String]) -> Command {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return Command::Enter,
        "s" | "skip" => return Command::Skip,
        "r" | "restart" => return Command::Restart,
        "q" | "quit" => return Command::Quit,
        _ => {}
    }

    let by_number = line
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| choices.get(index));
    let by_label = || choices.iter().find(|choice| choice.eq_ignore_ascii_case(line));

    by_number
        .or_else(by_label)
        .map_or_else(|| Command::Unknown(line.to_owned()), |choice| Command::Choose(choice.clone()))
}

/// Reads stdin lines on a dedicated thread.
///
/// The thread ends at end of input; it is not joined, so a pending read never
/// holds up shutdown.
#[must_use]
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Applies learner input to the lesson until input ends, the learner quits,
/// or the lesson stops. End of input tears the lesson down.
pub async fn drive<W>(
    handle: LessonHandle,
    observer: Arc<TerminalObserver<W>>,
    mut lines: mpsc::UnboundedReceiver<String>,
) where
    W: Write + Send,
{
    while let Some(line) = lines.recv().await {
        let result = match parse_command(&line, &observer.current_choices()) {
            Command::Enter => match handle.phase() {
                LessonPhase::Revealing => handle.skip_reveal(),
                LessonPhase::ReadyToAdvance => handle.continue_lesson(),
                _ => Ok(()),
            },
            Command::Skip => handle.skip_reveal(),
            Command::Restart => handle.restart(),
            Command::Quit => {
                handle.teardown();
                return;
            }
            Command::Choose(choice) => match handle.select_choice(choice).await {
                Err(LessonError::InvalidChoice { .. }) => {
                    observer.notice("That isn't one of the options.");
                    Ok(())
                }
                other => other,
            },
            Command::Unknown(text) => {
                observer.notice(&format!(
                    "Unrecognized input {text:?}. Pick a number, press Enter, or type s, r or q."
                ));
                Ok(())
            }
        };
        if let Err(err) = result {
            debug!(error = %err, "lesson no longer accepts input");
            return;
        }
    }

    debug!("input closed");
    handle.teardown();
}
