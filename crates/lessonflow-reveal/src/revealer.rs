//! The typed revealer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::state::RevealState;

type TickFn = Box<dyn FnMut(&str) + Send>;
type CompleteFn = Box<dyn FnOnce() + Send>;

/// Pacing configuration for reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    /// Delay between successive characters.
    pub char_interval: Duration,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            char_interval: Duration::from_millis(30),
        }
    }
}

struct ActiveReveal {
    id: u64,
    state: RevealState,
    on_tick: TickFn,
    on_complete: Option<CompleteFn>,
}

impl ActiveReveal {
    fn emit_tick(&mut self) {
        (self.on_tick)(self.state.prefix());
    }
}

#[derive(Default)]
struct Shared {
    next_id: u64,
    active: Option<ActiveReveal>,
}

impl Shared {
    fn active_mut(&mut self, id: u64) -> Option<&mut ActiveReveal> {
        self.active.as_mut().filter(|active| active.id == id)
    }

    fn take_active(&mut self, id: u64) -> Option<ActiveReveal> {
        if self.active.as_ref().is_some_and(|active| active.id == id) {
            self.active.take()
        } else {
            None
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reveals text one character at a time, at most one reveal at a time.
///
/// Callbacks run on the tokio scheduler while the revealer's internal lock is
/// held, so they never overlap with each other or with `start`, `cancel` and
/// `finish`. They must not call back into the same revealer.
#[derive(Clone)]
pub struct TypedRevealer {
    config: RevealConfig,
    shared: Arc<Mutex<Shared>>,
}

impl std::fmt::Debug for TypedRevealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedRevealer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TypedRevealer {
    /// Creates an idle revealer.
    #[must_use]
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// The pacing configuration.
    #[must_use]
    pub fn config(&self) -> RevealConfig {
        self.config
    }

    /// Begins revealing `text`, canceling any reveal already in progress.
    ///
    /// `on_tick` receives the revealed prefix at every character boundary,
    /// starting with the empty prefix; `on_complete` runs exactly once after
    /// the full text was ticked, unless the reveal is canceled first. Must be
    /// called from within a tokio runtime.
    pub fn start<T, C>(&self, text: impl Into<String>, on_tick: T, on_complete: C) -> RevealHandle
    where
        T: FnMut(&str) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let mut shared = lock(&self.shared);
        if let Some(mut previous) = shared.active.take() {
            previous.state.stop_timer();
            debug!(reveal_id = previous.id, "reveal superseded");
        }

        shared.next_id += 1;
        let id = shared.next_id;
        let mut state = RevealState::new(text);
        debug!(reveal_id = id, chars = state.char_len(), "reveal started");

        let timer = tokio::spawn(tick_loop(
            Arc::clone(&self.shared),
            id,
            self.config.char_interval,
        ));
        state.attach_timer(timer.abort_handle());
        shared.active = Some(ActiveReveal {
            id,
            state,
            on_tick: Box::new(on_tick),
            on_complete: Some(Box::new(on_complete)),
        });

        RevealHandle {
            id,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Stops the reveal behind `handle`. Its completion callback never runs.
    ///
    /// Returns `false` if the reveal had already completed, been canceled, or
    /// been superseded.
    pub fn cancel(&self, handle: &RevealHandle) -> bool {
        handle.cancel_in_place()
    }

    /// Jumps straight to the full text: emits one tick with the whole string,
    /// then completes.
    ///
    /// Returns `false` if the reveal is no longer active.
    pub fn finish(&self, handle: &RevealHandle) -> bool {
        let mut shared = lock(&self.shared);
        let Some(mut active) = shared.take_active(handle.id) else {
            return false;
        };
        active.state.stop_timer();
        active.state.reveal_all();
        active.emit_tick();
        if let Some(on_complete) = active.on_complete.take() {
            on_complete();
        }
        debug!(reveal_id = handle.id, "reveal finished early");
        true
    }

    /// Returns `true` while the reveal behind `handle` is still ticking.
    #[must_use]
    pub fn is_active(&self, handle: &RevealHandle) -> bool {
        lock(&self.shared).active_mut(handle.id).is_some()
    }
}

/// Ownership of one reveal's timer. Dropping the handle cancels the reveal.
#[must_use = "dropping a RevealHandle cancels the reveal"]
pub struct RevealHandle {
    id: u64,
    shared: Arc<Mutex<Shared>>,
}

impl std::fmt::Debug for RevealHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealHandle").field("id", &self.id).finish()
    }
}

impl RevealHandle {
    /// Cancels the reveal. Safe to call after natural completion.
    pub fn cancel(self) -> bool {
        self.cancel_in_place()
    }

    fn cancel_in_place(&self) -> bool {
        let mut shared = lock(&self.shared);
        match shared.take_active(self.id) {
            Some(mut active) => {
                active.state.stop_timer();
                debug!(
                    reveal_id = self.id,
                    revealed = active.state.revealed_length(),
                    "reveal canceled"
                );
                true
            }
            None => false,
        }
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.cancel_in_place();
    }
}

async fn tick_loop(shared: Arc<Mutex<Shared>>, id: u64, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if !tick(&shared, id) {
            break;
        }
    }
}

/// Emits one tick for reveal `id`. Returns `false` when the loop should stop.
fn tick(shared: &Mutex<Shared>, id: u64) -> bool {
    let mut shared = lock(shared);
    let Some(active) = shared.active_mut(id) else {
        return false;
    };

    active.emit_tick();
    if !active.state.is_complete() {
        active.state.step_forward();
        return true;
    }

    if let Some(mut finished) = shared.take_active(id) {
        finished.state.release_timer();
        if let Some(on_complete) = finished.on_complete.take() {
            on_complete();
        }
        debug!(reveal_id = id, "reveal completed");
    }
    false
}
