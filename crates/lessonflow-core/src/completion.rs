//! The completion record emitted once per finished lesson.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of a lesson sequence that reached its terminal step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Identifies this particular play-through; shared with log lines.
    pub run_id: Uuid,
    /// The lesson sequence that was completed.
    pub sequence_id: String,
    /// Time from flow start (or last restart) to completion.
    pub elapsed_ms: u64,
    /// Choice made on each choice-gated step, keyed by step id.
    pub choices: BTreeMap<String, String>,
    /// Whether any `ai-action` step displayed generated or fallback content.
    pub ai_content_used: bool,
    /// Number of steps advanced through.
    pub steps_completed: usize,
    /// Wall-clock completion time.
    pub completed_at: DateTime<Utc>,
}
