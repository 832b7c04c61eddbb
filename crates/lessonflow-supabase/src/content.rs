//! Lesson content from the `content_blocks` table.

use async_trait::async_trait;
use lessonflow_core::error::LessonError;
use lessonflow_core::step::{Emotion, NarrativeTag, Speaker, Step, StepKind};
use lessonflow_core::store::ContentStore;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::client::{authorize, build_client, ensure_success};
use crate::config::SupabaseConfig;

/// One row of `content_blocks`, as returned by the REST endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlockRow {
    /// Row id; used as the step id unless metadata names one.
    pub id: i64,
    /// Block type, e.g. `text`, `callout_box`, `choice`, `ai_action`.
    #[serde(rename = "type")]
    pub block_type: String,
    /// Display text, or the prompt of an AI block without one in metadata.
    #[serde(default)]
    pub content: String,
    /// Play order within the lesson.
    pub order_index: i64,
    /// Free-form block settings.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Inactive rows are skipped.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Hidden rows are skipped.
    #[serde(default)]
    pub is_visible: Option<bool>,
}

/// Step settings carried in a block's `metadata` column.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BlockMetadata {
    #[serde(alias = "step_id")]
    step_id: Option<String>,
    choices: Vec<String>,
    #[serde(alias = "auto_advance_delay_ms")]
    auto_advance_delay_ms: Option<u64>,
    #[serde(alias = "wait_for_continue")]
    wait_for_continue: bool,
    #[serde(alias = "ai_prompt")]
    ai_prompt: Option<String>,
    #[serde(alias = "fallback_content")]
    fallback_content: Option<String>,
    speaker: Option<Speaker>,
    #[serde(alias = "narrative_tag")]
    narrative_tag: Option<NarrativeTag>,
    emotion: Option<Emotion>,
}

fn kind_for(block_type: &str) -> Option<StepKind> {
    match block_type {
        "text" | "message" => Some(StepKind::Message),
        "callout_box" | "system" => Some(StepKind::System),
        "choice" | "select" | "quiz" => Some(StepKind::Choice),
        "ai_action" | "ai-action" => Some(StepKind::AiAction),
        _ => None,
    }
}

/// Maps one block to a step.
///
/// Returns `Ok(None)` for inactive, hidden, or non-playable blocks.
///
/// # Errors
///
/// Returns `LessonError::ContentUnavailable` if the block's metadata cannot
/// be read.
pub fn step_from_block(row: ContentBlockRow) -> Result<Option<Step>, LessonError> {
    if row.is_active == Some(false) || row.is_visible == Some(false) {
        return Ok(None);
    }
    let Some(kind) = kind_for(&row.block_type) else {
        debug!(block_id = row.id, block_type = %row.block_type, "skipping non-playable block");
        return Ok(None);
    };

    let metadata: BlockMetadata = match row.metadata {
        None => BlockMetadata::default(),
        Some(value) => serde_json::from_value(value).map_err(|err| {
            LessonError::ContentUnavailable(format!("block {}: bad metadata: {err}", row.id))
        })?,
    };

    let (text, ai_prompt) = match (kind, metadata.ai_prompt) {
        (StepKind::AiAction, None) => (String::new(), Some(row.content)),
        (_, prompt) => (row.content, prompt),
    };
    let default_speaker = if kind == StepKind::System {
        Speaker::System
    } else {
        Speaker::Guide
    };

    Ok(Some(Step {
        id: metadata.step_id.unwrap_or_else(|| row.id.to_string()),
        kind,
        speaker: metadata.speaker.unwrap_or(default_speaker),
        text,
        choices: metadata.choices,
        auto_advance_delay_ms: metadata.auto_advance_delay_ms,
        wait_for_continue: metadata.wait_for_continue,
        ai_prompt,
        fallback_content: metadata.fallback_content,
        narrative_tag: metadata.narrative_tag,
        emotion: metadata.emotion,
    }))
}

/// Maps rows to steps in `order_index` order, dropping unplayable rows.
///
/// # Errors
///
/// Returns the first mapping error.
pub fn steps_from_blocks(mut rows: Vec<ContentBlockRow>) -> Result<Vec<Step>, LessonError> {
    rows.sort_by_key(|row| row.order_index);
    let mut steps = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(step) = step_from_block(row)? {
            steps.push(step);
        }
    }
    Ok(steps)
}

/// Reads lessons from the hosted `content_blocks` table.
#[derive(Debug, Clone)]
pub struct SupabaseContentStore {
    config: SupabaseConfig,
    http_client: Client,
}

impl SupabaseContentStore {
    /// Creates the store.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Infrastructure` if the HTTP client cannot be
    /// built.
    pub fn new(config: SupabaseConfig) -> Result<Self, LessonError> {
        let http_client = build_client(&config)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn blocks_url(&self, lesson_id: i64) -> String {
        format!(
            "{}?lesson_id=eq.{lesson_id}&order=order_index.asc",
            self.config.endpoint("rest/v1/content_blocks")
        )
    }
}

/// Hosted lesson ids are integers.
///
/// # Errors
///
/// Returns `LessonError::ContentUnavailable` for anything else.
pub fn parse_lesson_id(lesson_id: &str) -> Result<i64, LessonError> {
    lesson_id
        .trim()
        .parse()
        .map_err(|_| LessonError::ContentUnavailable(format!("invalid lesson id {lesson_id:?}")))
}

#[async_trait]
impl ContentStore for SupabaseContentStore {
    #[instrument(skip(self))]
    async fn fetch_steps(&self, lesson_id: &str) -> Result<Vec<Step>, LessonError> {
        let numeric_id = parse_lesson_id(lesson_id)?;
        let request = self.http_client.get(self.blocks_url(numeric_id));
        let response = authorize(request, &self.config)
            .send()
            .await
            .map_err(|err| LessonError::Infrastructure(err.to_string()))?;
        let response = ensure_success(response)
            .await
            .map_err(LessonError::Infrastructure)?;
        let rows: Vec<ContentBlockRow> = response.json().await.map_err(|err| {
            LessonError::ContentUnavailable(format!("unreadable content blocks: {err}"))
        })?;

        let fetched = rows.len();
        let steps = steps_from_blocks(rows)?;
        info!(fetched, playable = steps.len(), "content blocks loaded");
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> ContentBlockRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_text_block_maps_to_guide_message() {
        // Arrange
        let block = row(json!({
            "id": 11,
            "type": "text",
            "content": "Hi, I'm Maya.",
            "order_index": 1,
            "metadata": { "autoAdvanceDelayMs": 1200, "emotion": "hopeful" },
            "is_active": true,
            "is_visible": true
        }));

        // Act
        let step = step_from_block(block).unwrap().unwrap();

        // Assert
        assert_eq!(step.id, "11");
        assert_eq!(step.kind, StepKind::Message);
        assert_eq!(step.speaker, Speaker::Guide);
        assert_eq!(step.text, "Hi, I'm Maya.");
        assert_eq!(step.auto_advance_delay_ms, Some(1200));
        assert_eq!(step.emotion, Some(Emotion::Hopeful));
    }

    #[test]
    fn test_select_block_maps_to_choice_with_named_step_id() {
        let block = row(json!({
            "id": 12,
            "type": "select",
            "content": "How formal?",
            "order_index": 2,
            "metadata": { "stepId": "tone", "choices": ["Formal", "Friendly"] }
        }));

        let step = step_from_block(block).unwrap().unwrap();

        assert_eq!(step.id, "tone");
        assert_eq!(step.kind, StepKind::Choice);
        assert_eq!(step.choices, vec!["Formal", "Friendly"]);
    }

    #[test]
    fn test_ai_block_without_prompt_uses_content_as_prompt() {
        let block = row(json!({
            "id": 13,
            "type": "ai_action",
            "content": "Draft an email to a landlord.",
            "order_index": 3,
            "metadata": { "fallback_content": "Dear Ms. Rivera," }
        }));

        let step = step_from_block(block).unwrap().unwrap();

        assert_eq!(step.kind, StepKind::AiAction);
        assert!(step.text.is_empty());
        assert_eq!(step.ai_prompt.as_deref(), Some("Draft an email to a landlord."));
        assert_eq!(step.fallback_content.as_deref(), Some("Dear Ms. Rivera,"));
    }

    #[test]
    fn test_callout_block_is_spoken_by_system() {
        let block = row(json!({
            "id": 14, "type": "callout_box", "content": "Saved", "order_index": 4, "metadata": null
        }));

        let step = step_from_block(block).unwrap().unwrap();

        assert_eq!(step.kind, StepKind::System);
        assert_eq!(step.speaker, Speaker::System);
    }

    #[test]
    fn test_hidden_inactive_and_unknown_blocks_are_skipped() {
        let hidden = row(json!({ "id": 1, "type": "text", "content": "x", "order_index": 1, "is_visible": false }));
        let inactive = row(json!({ "id": 2, "type": "text", "content": "x", "order_index": 2, "is_active": false }));
        let widget = row(json!({ "id": 3, "type": "document_improver", "content": "x", "order_index": 3 }));

        assert_eq!(step_from_block(hidden).unwrap(), None);
        assert_eq!(step_from_block(inactive).unwrap(), None);
        assert_eq!(step_from_block(widget).unwrap(), None);
    }

    #[test]
    fn test_bad_metadata_is_content_unavailable() {
        let block = row(json!({
            "id": 5, "type": "text", "content": "x", "order_index": 1,
            "metadata": { "emotion": "furious" }
        }));

        let result = step_from_block(block);

        assert!(matches!(result, Err(LessonError::ContentUnavailable(reason)) if reason.starts_with("block 5")));
    }

    #[test]
    fn test_steps_from_blocks_orders_by_order_index() {
        let rows = vec![
            row(json!({ "id": 2, "type": "text", "content": "second", "order_index": 20 })),
            row(json!({ "id": 9, "type": "lyra_chat", "content": "", "order_index": 15 })),
            row(json!({ "id": 1, "type": "text", "content": "first", "order_index": 10 })),
        ];

        let steps = steps_from_blocks(rows).unwrap();

        let texts: Vec<&str> = steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_parse_lesson_id_requires_integer() {
        assert_eq!(parse_lesson_id(" 42 ").unwrap(), 42);
        assert!(matches!(
            parse_lesson_id("email-basics"),
            Err(LessonError::ContentUnavailable(_))
        ));
    }

    #[test]
    fn test_blocks_url_filters_and_orders() {
        let store = SupabaseContentStore::new(SupabaseConfig::new("https://abc.supabase.co", "anon")).unwrap();

        assert_eq!(
            store.blocks_url(42),
            "https://abc.supabase.co/rest/v1/content_blocks?lesson_id=eq.42&order=order_index.asc"
        );
    }
}
