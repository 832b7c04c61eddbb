//! Lessonflow — hosted store adapters.
//!
//! Implements the lesson collaborators against a Supabase project: lesson
//! content from the `content_blocks` table, completion records upserted into
//! `lesson_progress`, and character content from the
//! `generate-character-content` edge function.

pub mod config;
pub mod content;
mod client;
pub mod generator;
pub mod progress;

pub use config::SupabaseConfig;
pub use content::SupabaseContentStore;
pub use generator::EdgeFunctionGenerator;
pub use progress::SupabaseProgressStore;
