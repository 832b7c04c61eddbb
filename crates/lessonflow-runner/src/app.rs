//! Collaborator wiring.

use std::sync::Arc;

use async_trait::async_trait;
use lessonflow_content::FileContentStore;
use lessonflow_core::clock::SystemClock;
use lessonflow_core::generation::{ContentGenerator, GenerationError};
use lessonflow_core::store::{ContentStore, ProgressStore};
use lessonflow_lesson::Collaborators;
use lessonflow_supabase::{EdgeFunctionGenerator, SupabaseContentStore, SupabaseProgressStore};
use tracing::info;

use crate::config::{ContentOrigin, RunnerConfig};
use crate::error::AppError;
use crate::progress_log::JsonLinesProgressStore;

/// Generator used when no hosted project is configured. Every `ai-action`
/// step shows its fallback content.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl ContentGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Rejected(
            "no content generation service configured".to_owned(),
        ))
    }
}

/// Builds the store, generator and progress sink `config` asks for.
///
/// # Errors
///
/// Returns `AppError::Lesson` if a hosted adapter cannot be constructed.
pub fn build_collaborators(config: &RunnerConfig) -> Result<Collaborators, AppError> {
    let content: Arc<dyn ContentStore> = match (&config.content, &config.supabase) {
        (ContentOrigin::Files(root), _) => Arc::new(FileContentStore::new(root.clone())),
        (ContentOrigin::Supabase, Some(supabase)) => {
            Arc::new(SupabaseContentStore::new(supabase.clone())?)
        }
        (ContentOrigin::Supabase, None) => {
            return Err(AppError::Config(
                "hosted content requires SUPABASE_URL and SUPABASE_ANON_KEY".to_owned(),
            ));
        }
    };

    let generator: Arc<dyn ContentGenerator> = match &config.supabase {
        Some(supabase) => Arc::new(EdgeFunctionGenerator::new(supabase.clone())?),
        None => Arc::new(OfflineGenerator),
    };

    let progress: Arc<dyn ProgressStore> = match &config.supabase {
        Some(supabase) if config.reports_to_supabase() => {
            Arc::new(SupabaseProgressStore::new(supabase.clone())?)
        }
        _ => Arc::new(JsonLinesProgressStore::new(config.progress_log.clone())),
    };

    info!(
        content = ?config.content,
        hosted_generation = config.supabase.is_some(),
        hosted_progress = config.reports_to_supabase(),
        "collaborators configured"
    );

    Ok(Collaborators {
        content,
        generator,
        progress,
        clock: Arc::new(SystemClock),
    })
}
