//! Test generators — canned `ContentGenerator` implementations.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lessonflow_core::generation::{ContentGenerator, GenerationError};
use tokio::sync::watch;

/// A generator that answers every prompt with the same content and records
/// the prompts it was given.
#[derive(Debug)]
pub struct ScriptedGenerator {
    content: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// Create a generator that always returns `content`.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Returns the prompts received so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        Ok(self.content.clone())
    }
}

/// A generator that rejects every prompt and counts the calls.
#[derive(Debug, Default)]
pub struct FailingGenerator {
    calls: Mutex<usize>,
}

impl FailingGenerator {
    /// Create a rejecting generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many times `generate` was called.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ContentGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        *self.calls.lock().unwrap() += 1;
        Err(GenerationError::Rejected("service unavailable".into()))
    }
}

/// A generator that never answers. Useful for timeout and teardown paths.
#[derive(Debug)]
pub struct HangingGenerator;

#[async_trait]
impl ContentGenerator for HangingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        std::future::pending().await
    }
}

/// A generator whose calls block until [`GatedGenerator::release`] opens
/// the gate. Call `n` answers `"draft n"`.
#[derive(Debug)]
pub struct GatedGenerator {
    gate: watch::Sender<bool>,
    calls: AtomicUsize,
}

impl GatedGenerator {
    /// Create a generator with the gate closed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gate: watch::Sender::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Opens the gate for every pending and future call.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Returns how many times `generate` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for GatedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for GatedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|_| GenerationError::Rejected("gate dropped".into()))?;
        Ok(format!("draft {call}"))
    }
}
