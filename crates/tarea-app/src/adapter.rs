//! Async persistence contract shared by the local and remote backends.

use tarea_core::{Clock, Comment, SystemClock, Task, TaskId, TaskPatch};
use tarea_store_http::{HttpStore, HttpStoreError};
use tarea_store_local::{LocalStore, LocalStoreError};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

/// Failure taxonomy reported by every backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The backend could not be reached.
    #[error("connection failed: {0}")]
    Connectivity(String),
    /// Credentials were missing or refused.
    #[error("not authorized: {0}")]
    Auth(String),
    /// The addressed record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend rejected the payload.
    #[error("rejected: {0}")]
    Validation(String),
    /// Local storage failed (I/O, decode, lock).
    #[error("storage error: {0}")]
    Storage(String),
    /// Any other status or an undecodable body.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<LocalStoreError> for AdapterError {
    fn from(err: LocalStoreError) -> Self {
        match err {
            LocalStoreError::TaskNotFound(id) | LocalStoreError::NoteNotFound(id) => Self::NotFound(id),
            LocalStoreError::Invalid(err) => Self::Validation(err.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<HttpStoreError> for AdapterError {
    fn from(err: HttpStoreError) -> Self {
        match err {
            HttpStoreError::InvalidUrl(_) | HttpStoreError::Transport(_) => Self::Connectivity(err.to_string()),
            HttpStoreError::Unauthorized { .. } => Self::Auth(err.to_string()),
            HttpStoreError::NotFound { url } => Self::NotFound(url),
            HttpStoreError::Rejected { body, .. } => Self::Validation(body),
            HttpStoreError::Encode(_) => Self::Validation(err.to_string()),
            HttpStoreError::UnexpectedStatus { .. } | HttpStoreError::Decode(_) => {
                Self::UnexpectedResponse(err.to_string())
            }
        }
    }
}

/// Async persistence contract used by the task store.
///
/// Every operation returns the backend-confirmed entity so callers only ever
/// mirror state the backend accepted.
#[allow(async_fn_in_trait)]
pub trait TaskAdapter: Send + Sync {
    /// Read the whole collection in backend order.
    ///
    /// # Errors
    /// Returns an [`AdapterError`] when the collection cannot be read.
    async fn fetch_all(&self) -> Result<Vec<Task>, AdapterError>;

    /// Persist a new task and return the stored version.
    ///
    /// # Errors
    /// Returns an [`AdapterError`] when the task is not persisted.
    async fn create(&self, task: &Task) -> Result<Task, AdapterError>;

    /// Merge `patch` into the stored task, stamping `updatedAt`.
    ///
    /// # Errors
    /// Returns [`AdapterError::NotFound`] for an unknown id.
    async fn update(&self, id: &TaskId, patch: &TaskPatch, at: OffsetDateTime) -> Result<Task, AdapterError>;

    /// Delete a task.
    ///
    /// # Errors
    /// Returns an [`AdapterError`] when the backend refuses the deletion.
    async fn remove(&self, id: &TaskId) -> Result<(), AdapterError>;

    /// Append a comment and return the stored version.
    ///
    /// # Errors
    /// Returns [`AdapterError::NotFound`] for an unknown task.
    async fn append_comment(&self, id: &TaskId, comment: &Comment) -> Result<Comment, AdapterError>;
}

async fn blocking<T, F>(store: &LocalStore, op: F) -> Result<T, AdapterError>
where
    T: Send + 'static,
    F: FnOnce(LocalStore) -> tarea_store_local::Result<T> + Send + 'static,
{
    // Clone the store so blocking I/O runs off the async worker.
    let store = store.clone();
    tokio::task::spawn_blocking(move || op(store))
        .await
        .map_err(|e| AdapterError::Storage(format!("Task join error: {e}")))?
        .map_err(AdapterError::from)
}

impl TaskAdapter for LocalStore {
    async fn fetch_all(&self) -> Result<Vec<Task>, AdapterError> {
        let now = SystemClock.now();
        blocking(self, move |store| store.load_tasks(now)).await
    }

    async fn create(&self, task: &Task) -> Result<Task, AdapterError> {
        let task = task.clone();
        blocking(self, move |store| store.insert_task(&task)).await
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch, at: OffsetDateTime) -> Result<Task, AdapterError> {
        let id = id.clone();
        let patch = patch.clone();
        blocking(self, move |store| store.update_task(&id, &patch, at)).await
    }

    async fn remove(&self, id: &TaskId) -> Result<(), AdapterError> {
        let id = id.clone();
        let removed = blocking(self, move |store| store.remove_task(&id)).await?;
        if !removed {
            debug!("Local remove of an unknown task ignored");
        }
        Ok(())
    }

    async fn append_comment(&self, id: &TaskId, comment: &Comment) -> Result<Comment, AdapterError> {
        let id = id.clone();
        let stored = comment.clone();
        blocking(self, move |store| store.append_comment(&id, &stored)).await?;
        Ok(comment.clone())
    }
}

impl TaskAdapter for HttpStore {
    async fn fetch_all(&self) -> Result<Vec<Task>, AdapterError> {
        Ok(Self::fetch_all(self).await?)
    }

    async fn create(&self, task: &Task) -> Result<Task, AdapterError> {
        Ok(Self::create(self, task).await?)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch, _at: OffsetDateTime) -> Result<Task, AdapterError> {
        // The service stamps `updated_at` itself.
        Ok(Self::update(self, id, patch).await?)
    }

    async fn remove(&self, id: &TaskId) -> Result<(), AdapterError> {
        Ok(Self::remove(self, id).await?)
    }

    async fn append_comment(&self, id: &TaskId, comment: &Comment) -> Result<Comment, AdapterError> {
        Ok(Self::append_comment(self, id, &comment.content).await?)
    }
}

/// Backend selected at construction time.
#[derive(Debug, Clone)]
pub enum Backend {
    /// JSON documents in a data directory.
    Local(LocalStore),
    /// REST task service.
    Remote(HttpStore),
}

impl Backend {
    /// Short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
        }
    }
}

impl TaskAdapter for Backend {
    async fn fetch_all(&self) -> Result<Vec<Task>, AdapterError> {
        match self {
            Self::Local(store) => TaskAdapter::fetch_all(store).await,
            Self::Remote(store) => TaskAdapter::fetch_all(store).await,
        }
    }

    async fn create(&self, task: &Task) -> Result<Task, AdapterError> {
        match self {
            Self::Local(store) => TaskAdapter::create(store, task).await,
            Self::Remote(store) => TaskAdapter::create(store, task).await,
        }
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch, at: OffsetDateTime) -> Result<Task, AdapterError> {
        match self {
            Self::Local(store) => TaskAdapter::update(store, id, patch, at).await,
            Self::Remote(store) => TaskAdapter::update(store, id, patch, at).await,
        }
    }

    async fn remove(&self, id: &TaskId) -> Result<(), AdapterError> {
        match self {
            Self::Local(store) => TaskAdapter::remove(store, id).await,
            Self::Remote(store) => TaskAdapter::remove(store, id).await,
        }
    }

    async fn append_comment(&self, id: &TaskId, comment: &Comment) -> Result<Comment, AdapterError> {
        match self {
            Self::Local(store) => TaskAdapter::append_comment(store, id, comment).await,
            Self::Remote(store) => TaskAdapter::append_comment(store, id, comment).await,
        }
    }
}
