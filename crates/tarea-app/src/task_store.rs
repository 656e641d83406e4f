//! Task store: the in-memory collection kept in sync with a persistence backend.
//!
//! Commands validate input, call the adapter once and only then mirror the
//! confirmed result in memory, so a failed write never leaves a phantom entry.
//! The in-memory lock is released before every adapter call.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tarea_core::{
    Clock, Comment, CoreError, FieldPatch, SystemClock, Task, TaskDraft, TaskFilter, TaskId, TaskPatch,
};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::adapter::{AdapterError, TaskAdapter};
use crate::task_cache::{Board, TaskCollection};

const EVENT_CAPACITY: usize = 64;

/// Lifecycle of a [`TaskStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Constructed, nothing loaded yet.
    Uninitialized,
    /// Initial fetch in flight.
    Loading,
    /// Commands accepted.
    Ready,
    /// Session ended; every command is refused.
    Disposed,
}

impl StoreState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Disposed => "disposed",
        }
    }
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification sent to subscribers after each command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Initial load finished (successfully or with an empty fallback).
    Loaded {
        /// Number of tasks now in memory.
        count: usize,
    },
    /// A task was created.
    Created(TaskId),
    /// A task was updated.
    Updated(TaskId),
    /// A task was deleted.
    Deleted(TaskId),
    /// A comment was appended.
    CommentAdded {
        /// Target task.
        task: TaskId,
        /// Confirmed comment.
        comment: Comment,
    },
    /// A command failed; the message is also kept as the last error.
    Failed(String),
}

/// Errors returned by [`TaskStore`] commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskStoreError {
    /// The backend failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    /// The task is not in the collection.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// Input was rejected before reaching the backend.
    #[error("invalid input: {0}")]
    Validation(#[from] CoreError),
    /// The command is not allowed in the current state.
    #[error("cannot {operation} while {state}")]
    Lifecycle {
        /// Attempted operation.
        operation: &'static str,
        /// State at the time of the attempt.
        state: StoreState,
    },
}

struct Inner {
    state: StoreState,
    tasks: TaskCollection,
    last_error: Option<String>,
    events: Option<broadcast::Sender<StoreEvent>>,
}

/// Task collection backed by a [`TaskAdapter`].
pub struct TaskStore<A> {
    adapter: A,
    clock: Arc<dyn Clock>,
    inner: RwLock<Inner>,
}

impl<A: TaskAdapter> TaskStore<A> {
    /// Create a store using the system clock.
    #[must_use]
    pub fn init(adapter: A) -> Self {
        Self::with_clock(adapter, Arc::new(SystemClock))
    }

    /// Create a store with an explicit clock.
    #[must_use]
    pub fn with_clock(adapter: A, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            adapter,
            clock,
            inner: RwLock::new(Inner {
                state: StoreState::Uninitialized,
                tasks: TaskCollection::default(),
                last_error: None,
                events: Some(events),
            }),
        }
    }

    /// Borrow the backend.
    pub const fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Receive notifications for subsequent commands.
    ///
    /// After [`dispose`](Self::dispose) the receiver reports a closed channel.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        if let Some(events) = &self.read().events {
            return events.subscribe();
        }
        broadcast::channel(1).1
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> StoreState {
        self.read().state
    }

    /// Message of the most recent failure, if not cleared.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    /// Forget the last failure.
    pub fn clear_error(&self) {
        self.write().last_error = None;
    }

    /// Snapshot of the whole collection.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.read().tasks.to_vec()
    }

    /// A single task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.read().tasks.get(id).cloned()
    }

    /// Number of tasks in memory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().tasks.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().tasks.is_empty()
    }

    /// Fetch the collection from the backend. Allowed once.
    ///
    /// On failure the store still becomes ready, with an empty collection and
    /// the failure recorded.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::Lifecycle`] when called twice, or the adapter error.
    pub async fn load(&self) -> Result<usize, TaskStoreError> {
        {
            let mut inner = self.write();
            if inner.state != StoreState::Uninitialized {
                let err = TaskStoreError::Lifecycle {
                    operation: "load",
                    state: inner.state,
                };
                drop(inner);
                return Err(self.fail(err));
            }
            inner.state = StoreState::Loading;
        }

        let fetched = self.adapter.fetch_all().await;

        let mut inner = self.write();
        if inner.state != StoreState::Loading {
            debug!(state = %inner.state, "Discarding load result after dispose");
            return Err(TaskStoreError::Lifecycle {
                operation: "load",
                state: inner.state,
            });
        }
        inner.state = StoreState::Ready;
        match fetched {
            Ok(tasks) => {
                inner.tasks = TaskCollection::from_tasks(tasks);
                inner.last_error = None;
                let count = inner.tasks.len();
                Self::emit(&inner, StoreEvent::Loaded { count });
                drop(inner);
                info!(count, "Loaded tasks");
                Ok(count)
            }
            Err(err) => {
                inner.tasks.clear();
                Self::emit(&inner, StoreEvent::Loaded { count: 0 });
                drop(inner);
                Err(self.fail(err.into()))
            }
        }
    }

    /// Create a task from `draft`; the confirmed entity is prepended.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::Validation`] for a blank title, or the adapter error.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, TaskStoreError> {
        self.ensure_ready("create")?;
        let now = self.clock.now();
        let task = draft
            .into_task(TaskId::generate(), now)
            .map_err(|err| self.fail(err.into()))?;

        let created = self.adapter.create(&task).await.map_err(|err| self.fail(err.into()))?;

        let mut inner = self.write();
        inner.tasks.prepend(created.clone());
        Self::emit(&inner, StoreEvent::Created(created.id.clone()));
        drop(inner);
        debug!(task = %created.id, "Created task");
        Ok(created)
    }

    /// Apply `patch` to a known task; the confirmed entity replaces the old one.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::NotFound`] without calling the backend for an
    /// unknown id, [`TaskStoreError::Validation`] for a blank title, or the adapter error.
    pub async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, TaskStoreError> {
        self.ensure_ready("update")?;
        if !self.read().tasks.contains(id) {
            return Err(self.fail(TaskStoreError::NotFound(id.clone())));
        }
        patch.validate().map_err(|err| self.fail(err.into()))?;

        let now = self.clock.now();
        let updated = self
            .adapter
            .update(id, &patch, now)
            .await
            .map_err(|err| self.fail(err.into()))?;

        let mut inner = self.write();
        if !inner.tasks.replace(updated.clone()) {
            debug!(task = %id, "Updated task vanished from memory before confirmation");
        }
        Self::emit(&inner, StoreEvent::Updated(id.clone()));
        drop(inner);
        debug!(task = %id, "Updated task");
        Ok(updated)
    }

    /// Delete a task; it leaves memory once the backend confirms.
    ///
    /// # Errors
    /// Returns the adapter error.
    pub async fn delete(&self, id: &TaskId) -> Result<(), TaskStoreError> {
        self.ensure_ready("delete")?;
        self.adapter.remove(id).await.map_err(|err| self.fail(err.into()))?;

        let mut inner = self.write();
        inner.tasks.remove(id);
        Self::emit(&inner, StoreEvent::Deleted(id.clone()));
        drop(inner);
        debug!(task = %id, "Deleted task");
        Ok(())
    }

    /// Append a comment to a known task and stamp its `updatedAt`.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::Validation`] for blank content,
    /// [`TaskStoreError::NotFound`] for an unknown task, or the adapter error.
    pub async fn add_comment(&self, id: &TaskId, content: &str) -> Result<Comment, TaskStoreError> {
        self.ensure_ready("add a comment")?;
        let comment = Comment::new(content, self.clock.now()).map_err(|err| self.fail(err.into()))?;
        if !self.read().tasks.contains(id) {
            return Err(self.fail(TaskStoreError::NotFound(id.clone())));
        }

        let confirmed = self
            .adapter
            .append_comment(id, &comment)
            .await
            .map_err(|err| self.fail(err.into()))?;

        let mut inner = self.write();
        if let Some(task) = inner.tasks.get_mut(id) {
            task.push_comment(confirmed.clone());
        }
        Self::emit(
            &inner,
            StoreEvent::CommentAdded {
                task: id.clone(),
                comment: confirmed.clone(),
            },
        );
        drop(inner);
        Ok(confirmed)
    }

    /// Count one finished focus session against a task.
    ///
    /// # Errors
    /// Same as [`update`](Self::update).
    pub async fn record_pomodoro(&self, id: &TaskId) -> Result<Task, TaskStoreError> {
        let current = self.read().tasks.get(id).map(|task| task.pomodoro_count.unwrap_or(0));
        let Some(current) = current else {
            return Err(self.fail(TaskStoreError::NotFound(id.clone())));
        };
        let patch = TaskPatch {
            pomodoro_count: Some(FieldPatch::Set(current.saturating_add(1))),
            ..TaskPatch::default()
        };
        self.update(id, patch).await
    }

    /// Tasks matching `filter`, in collection order.
    #[must_use]
    pub fn list_filtered(&self, filter: &TaskFilter) -> Vec<Task> {
        let now = self.clock.now();
        self.read().tasks.filtered(filter, now)
    }

    /// Sorted distinct tags across the collection.
    #[must_use]
    pub fn all_tags(&self) -> Vec<String> {
        self.read().tasks.all_tags()
    }

    /// Kanban view capped at `limit` tasks per column.
    #[must_use]
    pub fn board(&self, limit: usize) -> Board {
        self.read().tasks.board(limit)
    }

    /// End the session: clear memory and close subscriber channels.
    pub fn dispose(&self) {
        let mut inner = self.write();
        inner.state = StoreState::Disposed;
        inner.tasks.clear();
        inner.events = None;
        drop(inner);
        info!("Task store disposed");
    }

    fn ensure_ready(&self, operation: &'static str) -> Result<(), TaskStoreError> {
        let state = self.read().state;
        if state == StoreState::Ready {
            return Ok(());
        }
        Err(self.fail(TaskStoreError::Lifecycle { operation, state }))
    }

    fn fail(&self, err: TaskStoreError) -> TaskStoreError {
        let message = err.to_string();
        warn!(error = %message, "Task store command failed");
        let mut inner = self.write();
        inner.last_error = Some(message.clone());
        Self::emit(&inner, StoreEvent::Failed(message));
        drop(inner);
        err
    }

    fn emit(inner: &Inner, event: StoreEvent) {
        if let Some(events) = &inner.events {
            // No subscribers is not an error.
            let _ = events.send(event);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
