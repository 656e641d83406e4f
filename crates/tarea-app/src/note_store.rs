//! Notes kept next to the task list, persisted in the local data directory.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tarea_core::{Clock, CoreError, Note, NoteDraft, NoteFilter, NoteId, NotePatch, SystemClock};
use tarea_store_local::{LocalStore, LocalStoreError};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors returned by [`NoteStore`] commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteStoreError {
    /// The note is not in the collection.
    #[error("note {0} not found")]
    NotFound(NoteId),
    /// Title or content was blank.
    #[error("invalid input: {0}")]
    Validation(#[from] CoreError),
    /// Reading or writing the notes document failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<LocalStoreError> for NoteStoreError {
    fn from(err: LocalStoreError) -> Self {
        match err {
            LocalStoreError::NoteNotFound(id) => Self::NotFound(NoteId::from(id)),
            LocalStoreError::Invalid(err) => Self::Validation(err),
            other => Self::Storage(other.to_string()),
        }
    }
}

#[derive(Default)]
struct Inner {
    notes: Vec<Note>,
    last_error: Option<String>,
}

/// In-memory notes mirrored to `tarea-notes.json`.
pub struct NoteStore {
    store: LocalStore,
    clock: Arc<dyn Clock>,
    inner: RwLock<Inner>,
}

impl NoteStore {
    /// Create an empty store over `store`; call [`load`](Self::load) next.
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a store with an explicit clock.
    #[must_use]
    pub fn with_clock(store: LocalStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Read the notes document. A failure leaves an empty list and records the error.
    ///
    /// # Errors
    /// Returns [`NoteStoreError::Storage`] when the document cannot be read.
    pub async fn load(&self) -> Result<usize, NoteStoreError> {
        let loaded = self.blocking(LocalStore::load_notes).await;
        let mut inner = self.write();
        match loaded {
            Ok(notes) => {
                let count = notes.len();
                inner.notes = notes;
                inner.last_error = None;
                drop(inner);
                debug!(count, "Loaded notes");
                Ok(count)
            }
            Err(err) => {
                inner.notes.clear();
                drop(inner);
                Err(self.fail(err))
            }
        }
    }

    /// Create a note and prepend it.
    ///
    /// # Errors
    /// Returns [`NoteStoreError::Validation`] for blank fields, or a storage error.
    pub async fn create(&self, draft: NoteDraft) -> Result<Note, NoteStoreError> {
        let note = draft
            .into_note(NoteId::generate(), self.clock.now())
            .map_err(|err| self.fail(err.into()))?;
        let stored = self
            .blocking(move |store| store.insert_note(&note))
            .await
            .map_err(|err| self.fail(err))?;
        self.write().notes.insert(0, stored.clone());
        Ok(stored)
    }

    /// Edit a note and stamp its `updatedAt`.
    ///
    /// # Errors
    /// Returns [`NoteStoreError::NotFound`] for an unknown id, or a validation or storage error.
    pub async fn update(&self, id: &NoteId, patch: NotePatch) -> Result<Note, NoteStoreError> {
        if !self.read().notes.iter().any(|note| &note.id == id) {
            return Err(self.fail(NoteStoreError::NotFound(id.clone())));
        }
        let at = self.clock.now();
        let target = id.clone();
        let updated = self
            .blocking(move |store| store.update_note(&target, &patch, at))
            .await
            .map_err(|err| self.fail(err))?;
        let mut inner = self.write();
        if let Some(slot) = inner.notes.iter_mut().find(|note| &note.id == id) {
            *slot = updated.clone();
        }
        drop(inner);
        Ok(updated)
    }

    /// Delete a note. Unknown ids are ignored.
    ///
    /// # Errors
    /// Returns a storage error when the document cannot be written.
    pub async fn delete(&self, id: &NoteId) -> Result<(), NoteStoreError> {
        let target = id.clone();
        self.blocking(move |store| store.remove_note(&target))
            .await
            .map_err(|err| self.fail(err))?;
        self.write().notes.retain(|note| &note.id != id);
        Ok(())
    }

    /// Notes matching `filter`, in collection order.
    #[must_use]
    pub fn list_filtered(&self, filter: &NoteFilter) -> Vec<Note> {
        self.read()
            .notes
            .iter()
            .filter(|note| filter.matches(note))
            .cloned()
            .collect()
    }

    /// Snapshot of every note.
    #[must_use]
    pub fn notes(&self) -> Vec<Note> {
        self.read().notes.clone()
    }

    /// Message of the most recent failure.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, NoteStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&LocalStore) -> tarea_store_local::Result<T> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| NoteStoreError::Storage(format!("Task join error: {e}")))?
            .map_err(NoteStoreError::from)
    }

    fn fail(&self, err: NoteStoreError) -> NoteStoreError {
        let message = err.to_string();
        warn!(error = %message, "Note store command failed");
        self.write().last_error = Some(message);
        err
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
