//! Drives a shared [`PomodoroTimer`] from the tokio clock.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tarea_core::{PomodoroTimer, SessionCompleted, SessionKind, Task, TaskId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::adapter::TaskAdapter;
use crate::task_store::{TaskStore, TaskStoreError};

const TICK: Duration = Duration::from_secs(1);
const EVENT_BUFFER: usize = 16;

/// Emitted by [`drive`] while the timer runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed.
    Tick {
        /// Seconds left in the session.
        remaining_secs: u32,
        /// Same value as `MM:SS`.
        display: String,
    },
    /// The session reached zero; the timer is stopped on the next session.
    Completed(SessionCompleted),
}

/// Tick `timer` once per second while it is active.
///
/// The task ends when the returned receiver is dropped. Pausing, resetting or
/// switching the timer through the shared handle takes effect on the next tick.
#[must_use]
pub fn drive(timer: Arc<Mutex<PomodoroTimer>>) -> (JoinHandle<()>, mpsc::Receiver<TimerEvent>) {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            if tx.is_closed() {
                break;
            }
            let Some(event) = advance(&timer) else {
                continue;
            };
            if tx.send(event).await.is_err() {
                break;
            }
        }
        debug!("Pomodoro driver stopped");
    });
    (handle, rx)
}

fn advance(timer: &Mutex<PomodoroTimer>) -> Option<TimerEvent> {
    let mut timer = timer.lock().unwrap_or_else(PoisonError::into_inner);
    if !timer.is_active() {
        return None;
    }
    if let Some(completed) = timer.tick() {
        info!(kind = ?completed.kind, minutes = completed.minutes, "Pomodoro session completed");
        return Some(TimerEvent::Completed(completed));
    }
    Some(TimerEvent::Tick {
        remaining_secs: timer.remaining_secs(),
        display: timer.remaining_display(),
    })
}

/// Count a finished focus session against `task`.
///
/// Break sessions and sessions without a task are ignored.
///
/// # Errors
/// Returns the store error when the update fails.
pub async fn record_completion<A: TaskAdapter>(
    store: &TaskStore<A>,
    task: Option<&TaskId>,
    completed: SessionCompleted,
) -> Result<Option<Task>, TaskStoreError> {
    match (completed.kind, task) {
        (SessionKind::Focus, Some(id)) => store.record_pomodoro(id).await.map(Some),
        _ => Ok(None),
    }
}
