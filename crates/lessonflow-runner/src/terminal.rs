//! Renders a running lesson in a terminal.

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use lessonflow_core::completion::CompletionRecord;
use lessonflow_core::step::{Speaker, Step};
use lessonflow_lesson::{ContentSource, LessonObserver};
use tracing::debug;

struct Screen<W> {
    out: W,
    printed: usize,
    choices: Vec<String>,
}

/// Typewriter-style lesson output.
///
/// Reveal ticks are printed incrementally, so only the newly revealed
/// characters are written on each tick.
pub struct TerminalObserver<W: Write + Send> {
    screen: Mutex<Screen<W>>,
}

impl<W: Write + Send> TerminalObserver<W> {
    /// Creates an observer writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            screen: Mutex::new(Screen {
                out,
                printed: 0,
                choices: Vec::new(),
            }),
        }
    }

    /// Choices offered by the current step, in display order. Filled as soon
    /// as the step starts so a choice can be typed during its reveal.
    pub fn current_choices(&self) -> Vec<String> {
        self.lock().choices.clone()
    }

    /// Prints a one-line message from the runner itself.
    pub fn notice(&self, message: &str) {
        self.render(|screen| writeln!(screen.out, "\n  ! {message}"));
    }

    fn lock(&self) -> MutexGuard<'_, Screen<W>> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render<F>(&self, draw: F)
    where
        F: FnOnce(&mut Screen<W>) -> io::Result<()>,
    {
        let mut screen = self.lock();
        let result = draw(&mut *screen).and_then(|()| screen.out.flush());
        if let Err(err) = result {
            debug!(error = %err, "terminal write failed");
        }
    }
}

fn speaker_label(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::Guide => "Guide",
        Speaker::User => "You",
        Speaker::System => "*",
    }
}

impl<W: Write + Send> LessonObserver for TerminalObserver<W> {
    fn on_step_changed(&self, step: &Step) {
        self.render(|screen| {
            screen.printed = 0;
            screen.choices.clone_from(&step.choices);
            write!(screen.out, "\n{}: ", speaker_label(step.speaker))
        });
    }

    fn on_reveal_tick(&self, revealed_prefix: &str) {
        self.render(|screen| {
            let Some(fresh) = revealed_prefix.get(screen.printed..) else {
                return Ok(());
            };
            screen.printed = revealed_prefix.len();
            screen.out.write_all(fresh.as_bytes())
        });
    }

    fn on_awaiting_choice(&self, _step_id: &str, choices: &[String]) {
        self.render(|screen| {
            screen.choices = choices.to_vec();
            writeln!(screen.out)?;
            for (number, choice) in choices.iter().enumerate() {
                writeln!(screen.out, "  {}) {choice}", number + 1)?;
            }
            write!(screen.out, "> ")
        });
    }

    fn on_awaiting_continue(&self, _step_id: &str) {
        self.render(|screen| write!(screen.out, "\n  (press Enter to continue) "));
    }

    fn on_generated_content(&self, _step_id: &str, content: &str, source: ContentSource) {
        self.render(|screen| {
            writeln!(screen.out)?;
            if source == ContentSource::Fallback {
                writeln!(screen.out, "  (example)")?;
            }
            for line in content.lines() {
                writeln!(screen.out, "  | {line}")?;
            }
            Ok(())
        });
    }

    fn on_restarted(&self) {
        self.render(|screen| writeln!(screen.out, "\n-- starting over --"));
    }

    fn on_complete(&self, record: &CompletionRecord) {
        self.render(|screen| {
            writeln!(
                screen.out,
                "\n\nLesson complete: {} steps in {}.{}s",
                record.steps_completed,
                record.elapsed_ms / 1000,
                record.elapsed_ms % 1000 / 100
            )?;
            for (step_id, choice) in &record.choices {
                writeln!(screen.out, "  {step_id}: {choice}")?;
            }
            Ok(())
        });
    }
}

#[cfg(test)]
impl TerminalObserver<Vec<u8>> {
    pub(crate) fn output(&self) -> String {
        String::from_utf8_lossy(&self.lock().out).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_reveal_ticks_print_only_new_characters() {
        // Arrange
        let observer = TerminalObserver::new(Vec::new());
        observer.on_step_changed(&Step::message("a", "Héllo"));

        // Act
        for prefix in ["", "H", "Hé", "Hél", "Héllo"] {
            observer.on_reveal_tick(prefix);
        }

        // Assert
        assert_eq!(observer.output(), "\nGuide: Héllo");
    }

    #[test]
    fn test_awaiting_choice_lists_numbered_options() {
        let observer = TerminalObserver::new(Vec::new());
        let choices = vec!["Formal".to_owned(), "Friendly".to_owned()];

        observer.on_awaiting_choice("tone", &choices);

        assert_eq!(observer.output(), "\n  1) Formal\n  2) Friendly\n> ");
        assert_eq!(observer.current_choices(), choices);
    }

    #[test]
    fn test_step_change_forgets_previous_choices() {
        let observer = TerminalObserver::new(Vec::new());
        observer.on_awaiting_choice("tone", &["Formal".to_owned()]);

        observer.on_step_changed(&Step::system("saved", "Saved"));

        assert!(observer.current_choices().is_empty());
        assert!(observer.output().ends_with("\n*: "));
    }

    #[test]
    fn test_choice_step_offers_choices_before_its_reveal_finishes() {
        let observer = TerminalObserver::new(Vec::new());

        observer.on_step_changed(&Step::choice("tone", "How formal?", ["Formal", "Friendly"]));

        assert_eq!(observer.current_choices(), vec!["Formal", "Friendly"]);
    }

    #[test]
    fn test_fallback_content_is_marked_as_example() {
        let observer = TerminalObserver::new(Vec::new());

        observer.on_generated_content("c", "Dear Ms. Rivera,\nThanks.", ContentSource::Fallback);

        assert_eq!(
            observer.output(),
            "\n  (example)\n  | Dear Ms. Rivera,\n  | Thanks.\n"
        );
    }

    #[test]
    fn test_completion_summary_lists_choices() {
        let observer = TerminalObserver::new(Vec::new());
        let record = CompletionRecord {
            run_id: Uuid::new_v4(),
            sequence_id: "l".to_owned(),
            elapsed_ms: 12_340,
            choices: BTreeMap::from([("tone".to_owned(), "Formal".to_owned())]),
            ai_content_used: true,
            steps_completed: 4,
            completed_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };

        observer.on_complete(&record);

        assert_eq!(
            observer.output(),
            "\n\nLesson complete: 4 steps in 12.3s\n  tone: Formal\n"
        );
    }
}
