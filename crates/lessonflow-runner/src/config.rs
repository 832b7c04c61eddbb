//! Runner configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use lessonflow_lesson::FlowConfig;
use lessonflow_supabase::SupabaseConfig;

use crate::error::AppError;

/// Default JSON-lines file completion records are appended to.
pub const DEFAULT_PROGRESS_LOG: &str = "lessonflow-progress.jsonl";

/// Where lesson content is read from.
#[derive(Debug, Clone)]
pub enum ContentOrigin {
    /// YAML documents under a directory.
    Files(PathBuf),
    /// The hosted `content_blocks` table.
    Supabase,
}

/// Everything the runner needs to play one lesson.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Lesson to play.
    pub lesson_id: String,
    /// Where the lesson's steps come from.
    pub content: ContentOrigin,
    /// Hosted project, when configured. Also used for generation and, with a
    /// user id, for progress.
    pub supabase: Option<SupabaseConfig>,
    /// Controller tunables.
    pub flow: FlowConfig,
    /// Local completion log, used when progress is not reported to the
    /// hosted store.
    pub progress_log: PathBuf,
}

impl RunnerConfig {
    /// Reads the configuration from the process environment. `lesson_arg`
    /// (the first command-line argument) takes precedence over
    /// `LESSONFLOW_LESSON_ID`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env(lesson_arg: Option<String>) -> Result<Self, AppError> {
        Self::from_lookup(lesson_arg, |key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup<F>(lesson_arg: Option<String>, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let lesson_id = lesson_arg
            .filter(|arg| !arg.trim().is_empty())
            .or_else(|| non_empty("LESSONFLOW_LESSON_ID"))
            .ok_or_else(|| {
                AppError::Config(
                    "LESSONFLOW_LESSON_ID must be set or the lesson id passed as an argument"
                        .to_owned(),
                )
            })?;

        let supabase = match (non_empty("SUPABASE_URL"), non_empty("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => {
                let mut config = SupabaseConfig::new(url, anon_key);
                config.access_token = non_empty("SUPABASE_ACCESS_TOKEN");
                config.user_id = non_empty("LESSONFLOW_USER_ID");
                Some(config)
            }
            (Some(_), None) => {
                return Err(AppError::Config(
                    "SUPABASE_ANON_KEY must be set when SUPABASE_URL is".to_owned(),
                ));
            }
            _ => None,
        };

        let content = match (non_empty("LESSONFLOW_CONTENT_DIR"), &supabase) {
            (Some(dir), _) => ContentOrigin::Files(PathBuf::from(dir)),
            (None, Some(_)) => ContentOrigin::Supabase,
            (None, None) => {
                return Err(AppError::Config(
                    "set LESSONFLOW_CONTENT_DIR or SUPABASE_URL and SUPABASE_ANON_KEY".to_owned(),
                ));
            }
        };

        let mut flow = FlowConfig::default();
        if let Some(ms) = parse_millis(&non_empty, "LESSONFLOW_CHAR_INTERVAL_MS")? {
            flow.reveal.char_interval = ms;
        }
        if let Some(ms) = parse_millis(&non_empty, "LESSONFLOW_GENERATION_TIMEOUT_MS")? {
            flow.generation_timeout = ms;
        }

        let progress_log = non_empty("LESSONFLOW_PROGRESS_LOG")
            .map_or_else(|| PathBuf::from(DEFAULT_PROGRESS_LOG), PathBuf::from);

        Ok(Self {
            lesson_id,
            content,
            supabase,
            flow,
            progress_log,
        })
    }

    /// Whether completions go to the hosted store rather than the local log.
    #[must_use]
    pub fn reports_to_supabase(&self) -> bool {
        self.supabase
            .as_ref()
            .is_some_and(|config| config.user_id.is_some())
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> Result<Option<Duration>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| AppError::Config(format!("{key} must be a whole number of milliseconds: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_file_store_config_uses_defaults() {
        // Arrange
        let lookup = lookup_from(&[
            ("LESSONFLOW_LESSON_ID", "email-basics"),
            ("LESSONFLOW_CONTENT_DIR", "lessons"),
        ]);

        // Act
        let config = RunnerConfig::from_lookup(None, lookup).unwrap();

        // Assert
        assert_eq!(config.lesson_id, "email-basics");
        assert!(matches!(config.content, ContentOrigin::Files(ref dir) if dir == &PathBuf::from("lessons")));
        assert!(config.supabase.is_none());
        assert_eq!(config.flow, FlowConfig::default());
        assert_eq!(config.progress_log, PathBuf::from(DEFAULT_PROGRESS_LOG));
        assert!(!config.reports_to_supabase());
    }

    #[test]
    fn test_argument_overrides_lesson_env_var() {
        let lookup = lookup_from(&[
            ("LESSONFLOW_LESSON_ID", "from-env"),
            ("LESSONFLOW_CONTENT_DIR", "lessons"),
        ]);

        let config = RunnerConfig::from_lookup(Some("from-arg".to_owned()), lookup).unwrap();

        assert_eq!(config.lesson_id, "from-arg");
    }

    #[test]
    fn test_missing_lesson_id_is_config_error() {
        let lookup = lookup_from(&[("LESSONFLOW_CONTENT_DIR", "lessons")]);

        let result = RunnerConfig::from_lookup(None, lookup);

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("LESSONFLOW_LESSON_ID")));
    }

    #[test]
    fn test_missing_content_source_is_config_error() {
        let lookup = lookup_from(&[("LESSONFLOW_LESSON_ID", "1")]);

        assert!(matches!(
            RunnerConfig::from_lookup(None, lookup),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_supabase_config_reads_credentials() {
        // Arrange
        let lookup = lookup_from(&[
            ("LESSONFLOW_LESSON_ID", "42"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("SUPABASE_ACCESS_TOKEN", "jwt"),
            ("LESSONFLOW_USER_ID", "user-1"),
        ]);

        // Act
        let config = RunnerConfig::from_lookup(None, lookup).unwrap();

        // Assert
        assert!(matches!(config.content, ContentOrigin::Supabase));
        let supabase = config.supabase.as_ref().unwrap();
        assert_eq!(supabase.url, "https://abc.supabase.co");
        assert_eq!(supabase.access_token.as_deref(), Some("jwt"));
        assert!(config.reports_to_supabase());
    }

    #[test]
    fn test_content_dir_wins_over_supabase_content() {
        let lookup = lookup_from(&[
            ("LESSONFLOW_LESSON_ID", "42"),
            ("LESSONFLOW_CONTENT_DIR", "lessons"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]);

        let config = RunnerConfig::from_lookup(None, lookup).unwrap();

        assert!(matches!(config.content, ContentOrigin::Files(_)));
        assert!(config.supabase.is_some());
        assert!(!config.reports_to_supabase());
    }

    #[test]
    fn test_url_without_key_is_config_error() {
        let lookup = lookup_from(&[
            ("LESSONFLOW_LESSON_ID", "42"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
        ]);

        assert!(matches!(
            RunnerConfig::from_lookup(None, lookup),
            Err(AppError::Config(msg)) if msg.contains("SUPABASE_ANON_KEY")
        ));
    }

    #[test]
    fn test_timing_overrides_are_parsed() {
        let lookup = lookup_from(&[
            ("LESSONFLOW_LESSON_ID", "l"),
            ("LESSONFLOW_CONTENT_DIR", "lessons"),
            ("LESSONFLOW_CHAR_INTERVAL_MS", "5"),
            ("LESSONFLOW_GENERATION_TIMEOUT_MS", "1500"),
            ("LESSONFLOW_PROGRESS_LOG", "/tmp/progress.jsonl"),
        ]);

        let config = RunnerConfig::from_lookup(None, lookup).unwrap();

        assert_eq!(config.flow.reveal.char_interval, Duration::from_millis(5));
        assert_eq!(config.flow.generation_timeout, Duration::from_millis(1500));
        assert_eq!(config.progress_log, PathBuf::from("/tmp/progress.jsonl"));
    }

    #[test]
    fn test_malformed_interval_is_config_error() {
        let lookup = lookup_from(&[
            ("LESSONFLOW_LESSON_ID", "l"),
            ("LESSONFLOW_CONTENT_DIR", "lessons"),
            ("LESSONFLOW_CHAR_INTERVAL_MS", "fast"),
        ]);

        assert!(matches!(
            RunnerConfig::from_lookup(None, lookup),
            Err(AppError::Config(msg)) if msg.starts_with("LESSONFLOW_CHAR_INTERVAL_MS")
        ));
    }
}
