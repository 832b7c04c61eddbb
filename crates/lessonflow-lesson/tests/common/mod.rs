//! Shared helpers for lesson flow integration tests.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use lessonflow_core::generation::ContentGenerator;
use lessonflow_core::step::Step;
use lessonflow_lesson::{
    ChannelObserver, Collaborators, FlowConfig, GuidedLessonController, LessonEvent, LessonHandle,
    LessonOutcome,
};
use lessonflow_test_support::{FixedClock, RecordingProgressStore, StaticContentStore};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// A lesson running on its own task plus everything a test needs to steer it.
pub struct RunningLesson {
    pub run: JoinHandle<LessonOutcome>,
    pub handle: LessonHandle,
    pub events: UnboundedReceiver<LessonEvent>,
    pub progress: Arc<RecordingProgressStore>,
}

pub async fn start_lesson(
    lesson_id: &str,
    steps: Vec<Step>,
    generator: Arc<dyn ContentGenerator>,
) -> RunningLesson {
    let progress = Arc::new(RecordingProgressStore::new());
    let collaborators = Collaborators {
        content: Arc::new(StaticContentStore::new(steps)),
        generator,
        progress: progress.clone(),
        clock: Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap())),
    };
    let (observer, events) = ChannelObserver::new();
    let (controller, handle) = GuidedLessonController::load(
        lesson_id,
        collaborators,
        Arc::new(observer),
        FlowConfig::default(),
    )
    .await
    .unwrap();

    RunningLesson {
        run: tokio::spawn(controller.run()),
        handle,
        events,
        progress,
    }
}

/// Waits for the next event satisfying `pred`, discarding the ones before it.
pub async fn wait_for<F>(events: &mut UnboundedReceiver<LessonEvent>, mut pred: F) -> LessonEvent
where
    F: FnMut(&LessonEvent) -> bool,
{
    loop {
        let event = events.recv().await.expect("event stream closed");
        if pred(&event) {
            return event;
        }
    }
}

/// Collects every event up to and including the first one satisfying `pred`.
pub async fn collect_until<F>(
    events: &mut UnboundedReceiver<LessonEvent>,
    mut pred: F,
) -> Vec<LessonEvent>
where
    F: FnMut(&LessonEvent) -> bool,
{
    let mut seen = Vec::new();
    loop {
        let event = events.recv().await.expect("event stream closed");
        let done = pred(&event);
        seen.push(event);
        if done {
            return seen;
        }
    }
}

/// Drains every event still buffered.
pub fn drain(events: &mut UnboundedReceiver<LessonEvent>) -> Vec<LessonEvent> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}
