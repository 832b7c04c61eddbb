//! The step model: one unit of a guided lesson sequence.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LessonError;

/// What a step does when it becomes current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// A line of dialogue from the guide (or the learner).
    Message,
    /// A prompt that gates advancement on a learner choice.
    Choice,
    /// A system notice, revealed like a message.
    System,
    /// A step whose content comes from the content-generation service.
    AiAction,
}

/// Who is speaking on a message or choice step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The lesson guide character.
    #[default]
    Guide,
    /// The learner.
    User,
    /// The application itself.
    System,
}

/// Structured narrative position of a step within a story-driven lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NarrativeTag {
    /// The guide introduces themselves.
    Introduction,
    /// The guide describes the problem they faced.
    Struggle,
    /// A first, unsuccessful attempt.
    Attempt,
    /// The guide learns the framework being taught.
    Discovery,
    /// The learner practices the framework.
    Practice,
    /// The guide shares the outcome.
    Success,
    /// The learner builds their own toolkit.
    Toolkit,
}

/// Expression shown on the guide's avatar while a step plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Emotion {
    /// Resting expression.
    Neutral,
    /// Looking forward to what comes next.
    Hopeful,
    /// Eager and energetic.
    Excited,
    /// Stuck on a problem.
    Frustrated,
    /// Concerned about an outcome.
    Worried,
    /// Nervous under pressure.
    Anxious,
    /// Let down by a result.
    Disappointed,
    /// Considering an idea.
    Thoughtful,
    /// Something just clicked.
    Enlightened,
    /// Surprised by a result.
    Amazed,
}

/// One unit of a guided lesson flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Unique identifier within its sequence.
    pub id: String,
    /// What the step does.
    pub kind: StepKind,
    /// Who is speaking.
    #[serde(default)]
    pub speaker: Speaker,
    /// Full display text; the source of truth for the reveal.
    #[serde(default)]
    pub text: String,
    /// Ordered selectable options. Non-empty only on choice-gated steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Delay before automatic advancement once the reveal completes.
    #[serde(
        default,
        alias = "autoAdvanceDelayMs",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_advance_delay_ms: Option<u64>,
    /// Hold the step after its reveal until `continue_lesson()` is called.
    ///
    /// Without this flag, a step with no choices and no delay advances as
    /// soon as its reveal (and any generation) finishes.
    #[serde(default, alias = "waitForContinue", skip_serializing_if = "is_false")]
    pub wait_for_continue: bool,
    /// Prompt passed to the content generator on `ai-action` steps.
    #[serde(default, alias = "aiPrompt", skip_serializing_if = "Option::is_none")]
    pub ai_prompt: Option<String>,
    /// Content shown when generation does not succeed.
    #[serde(
        default,
        alias = "fallbackContent",
        skip_serializing_if = "Option::is_none"
    )]
    pub fallback_content: Option<String>,
    /// Narrative position, used by presentation layers for staging.
    #[serde(default, alias = "narrativeTag", skip_serializing_if = "Option::is_none")]
    pub narrative_tag: Option<NarrativeTag>,
    /// Guide expression while the step plays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
}

impl Step {
    fn bare(id: impl Into<String>, kind: StepKind, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            speaker: Speaker::Guide,
            text: text.into(),
            choices: Vec::new(),
            auto_advance_delay_ms: None,
            wait_for_continue: false,
            ai_prompt: None,
            fallback_content: None,
            narrative_tag: None,
            emotion: None,
        }
    }

    /// Creates a guide message step.
    #[must_use]
    pub fn message(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::bare(id, StepKind::Message, text)
    }

    /// Creates a system notice step.
    #[must_use]
    pub fn system(id: impl Into<String>, text: impl Into<String>) -> Self {
        let mut step = Self::bare(id, StepKind::System, text);
        step.speaker = Speaker::System;
        step
    }

    /// Creates a choice step offering `choices` in order.
    #[must_use]
    pub fn choice<I, S>(id: impl Into<String>, text: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut step = Self::bare(id, StepKind::Choice, text);
        step.choices = choices.into_iter().map(Into::into).collect();
        step
    }

    /// Creates an `ai-action` step that sends `prompt` to the generator.
    #[must_use]
    pub fn ai_action(
        id: impl Into<String>,
        text: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        let mut step = Self::bare(id, StepKind::AiAction, text);
        step.ai_prompt = Some(prompt.into());
        step
    }

    /// Sets the automatic advance delay.
    #[must_use]
    pub fn with_auto_advance(mut self, delay_ms: u64) -> Self {
        self.auto_advance_delay_ms = Some(delay_ms);
        self
    }

    /// Holds the step until the learner explicitly continues.
    #[must_use]
    pub fn with_manual_continue(mut self) -> Self {
        self.wait_for_continue = true;
        self
    }

    /// Sets the fallback content for a failed generation.
    #[must_use]
    pub fn with_fallback(mut self, content: impl Into<String>) -> Self {
        self.fallback_content = Some(content.into());
        self
    }

    /// Sets the speaker.
    #[must_use]
    pub fn with_speaker(mut self, speaker: Speaker) -> Self {
        self.speaker = speaker;
        self
    }

    /// Sets the narrative tag.
    #[must_use]
    pub fn with_narrative_tag(mut self, tag: NarrativeTag) -> Self {
        self.narrative_tag = Some(tag);
        self
    }

    /// Sets the guide expression.
    #[must_use]
    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = Some(emotion);
        self
    }

    /// Returns `true` if advancement is gated on a learner choice.
    #[must_use]
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Returns `true` if `choice` is one of this step's options.
    #[must_use]
    pub fn offers(&self, choice: &str) -> bool {
        self.choices.iter().any(|c| c == choice)
    }

    /// Returns the automatic advance delay, if any.
    #[must_use]
    pub fn auto_advance_delay(&self) -> Option<Duration> {
        self.auto_advance_delay_ms.map(Duration::from_millis)
    }

    /// Checks the structural invariants of a single step.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ContentUnavailable` describing the first
    /// violated invariant.
    pub fn validate(&self) -> Result<(), LessonError> {
        let invalid = |reason: &str| {
            Err(LessonError::ContentUnavailable(format!(
                "step {:?}: {reason}",
                self.id
            )))
        };

        if self.id.trim().is_empty() {
            return invalid("id must not be empty");
        }
        if self.kind == StepKind::Choice && self.choices.is_empty() {
            return invalid("choice step must offer at least one choice");
        }
        if self.has_choices() && self.auto_advance_delay_ms.is_some() {
            return invalid("choice-gated step must not auto-advance");
        }
        if self.wait_for_continue && (self.has_choices() || self.auto_advance_delay_ms.is_some()) {
            return invalid("manual-continue step must not also auto-advance or offer choices");
        }
        if self.kind == StepKind::AiAction && self.ai_prompt.is_none() {
            return invalid("ai-action step requires an ai_prompt");
        }
        let mut seen = HashSet::new();
        if !self.choices.iter().all(|c| seen.insert(c.as_str())) {
            return invalid("duplicate choice label");
        }
        Ok(())
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !value
}

/// Checks every step and the uniqueness of step ids across a sequence.
///
/// # Errors
///
/// Returns `LessonError::ContentUnavailable` if the list is empty, an id
/// repeats, or any step is malformed.
pub fn validate_steps(steps: &[Step]) -> Result<(), LessonError> {
    if steps.is_empty() {
        return Err(LessonError::ContentUnavailable(
            "lesson has no steps".to_owned(),
        ));
    }
    let mut ids = HashSet::new();
    for step in steps {
        step.validate()?;
        if !ids.insert(step.id.as_str()) {
            return Err(LessonError::ContentUnavailable(format!(
                "duplicate step id {:?}",
                step.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_deserializes_camel_case_aliases() {
        // Arrange
        let json = serde_json::json!({
            "id": "c",
            "kind": "ai-action",
            "text": "",
            "aiPrompt": "write a subject line",
            "fallbackContent": "Thanks for your patience",
            "autoAdvanceDelayMs": 250,
            "narrativeTag": "practice"
        });

        // Act
        let step: Step = serde_json::from_value(json).unwrap();

        // Assert
        assert_eq!(step.kind, StepKind::AiAction);
        assert_eq!(step.speaker, Speaker::Guide);
        assert_eq!(step.ai_prompt.as_deref(), Some("write a subject line"));
        assert_eq!(step.fallback_content.as_deref(), Some("Thanks for your patience"));
        assert_eq!(step.auto_advance_delay(), Some(Duration::from_millis(250)));
        assert_eq!(step.narrative_tag, Some(NarrativeTag::Practice));
    }

    #[test]
    fn test_choice_step_with_auto_advance_is_rejected() {
        let step = Step::choice("b", "Pick", ["X", "Y"]).with_auto_advance(100);

        let err = step.validate().unwrap_err();

        assert!(matches!(err, LessonError::ContentUnavailable(msg) if msg.contains("auto-advance")));
    }

    #[test]
    fn test_manual_continue_conflicts_with_delay_and_choices() {
        let delayed = Step::message("a", "Hi").with_auto_advance(100).with_manual_continue();
        let gated = Step::choice("b", "Pick", ["X"]).with_manual_continue();

        assert!(delayed.validate().is_err());
        assert!(gated.validate().is_err());
        assert!(Step::message("a", "Hi").with_manual_continue().validate().is_ok());
    }

    #[test]
    fn test_wait_for_continue_defaults_off_and_accepts_camel_case() {
        // Arrange
        let plain = serde_json::json!({"id": "a", "kind": "message", "text": "Hi"});
        let manual = serde_json::json!({
            "id": "a",
            "kind": "message",
            "text": "Hi",
            "waitForContinue": true
        });

        // Act
        let plain: Step = serde_json::from_value(plain).unwrap();
        let manual: Step = serde_json::from_value(manual).unwrap();

        // Assert
        assert!(!plain.wait_for_continue);
        assert!(manual.wait_for_continue);
        assert!(serde_json::to_value(&plain).unwrap().get("wait_for_continue").is_none());
    }

    #[test]
    fn test_choice_step_without_choices_is_rejected() {
        let step = Step::choice("b", "Pick", Vec::<String>::new());

        assert!(step.validate().is_err());
    }

    #[test]
    fn test_ai_action_without_prompt_is_rejected() {
        let mut step = Step::ai_action("c", "", "p");
        step.ai_prompt = None;

        assert!(step.validate().is_err());
    }

    #[test]
    fn test_duplicate_choice_labels_are_rejected() {
        let step = Step::choice("b", "Pick", ["X", "X"]);

        assert!(step.validate().is_err());
    }

    #[test]
    fn test_validate_steps_rejects_empty_and_duplicate_ids() {
        assert!(matches!(
            validate_steps(&[]),
            Err(LessonError::ContentUnavailable(_))
        ));

        let steps = vec![Step::message("a", "Hi"), Step::message("a", "Again")];
        let err = validate_steps(&steps).unwrap_err();
        assert!(matches!(err, LessonError::ContentUnavailable(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_validate_steps_accepts_well_formed_sequence() {
        let steps = vec![
            Step::message("a", "Hi").with_auto_advance(100),
            Step::choice("b", "Pick", ["X", "Y"]),
            Step::ai_action("c", "", "p"),
        ];

        assert!(validate_steps(&steps).is_ok());
    }

    #[test]
    fn test_offers_matches_exact_labels_only() {
        let step = Step::choice("b", "Pick", ["X", "Y"]);

        assert!(step.offers("Y"));
        assert!(!step.offers("y"));
        assert!(!Step::message("a", "Hi").offers("X"));
    }
}
