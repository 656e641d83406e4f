//! File-backed storage for tarea.
//!
//! Each collection is a single JSON array stored under a fixed key inside a data
//! directory (`<dir>/<key>.json`). Writes go through a temp file in the same
//! directory followed by a rename, and read-modify-write cycles are serialized
//! by a process-local mutex shared between clones of the store.

mod demo;
mod error;

pub use demo::sample_tasks;
pub use error::{LocalStoreError, Result};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tarea_core::{Comment, Note, NoteId, NotePatch, Task, TaskId, TaskPatch};
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// Key of the task collection.
pub const TASKS_KEY: &str = "task-app-tasks";
/// Key of the notes collection.
pub const NOTES_KEY: &str = "tarea-notes";

const CORRUPT_SUFFIX: &str = "corrupt";

/// Storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
    seed_demo: bool,
    write_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Open (and create if needed) the data directory.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "Opened local store");
        Ok(Self {
            dir,
            seed_demo: true,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Whether a missing task document is seeded with the demo collection.
    #[must_use]
    pub const fn with_seed_demo(mut self, seed_demo: bool) -> Self {
        self.seed_demo = seed_demo;
        self
    }

    /// Data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document stored under `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Load the task collection.
    ///
    /// A missing document is seeded (when enabled) and written immediately.
    /// An undecodable document is moved aside to `<key>.json.corrupt`.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::Decode`] for a corrupt document, or an I/O error.
    pub fn load_tasks(&self, now: OffsetDateTime) -> Result<Vec<Task>> {
        let _guard = self.lock()?;
        if let Some(tasks) = self.read_or_quarantine(TASKS_KEY)? {
            debug!(count = tasks.len(), "Loaded tasks");
            return Ok(tasks);
        }
        if !self.seed_demo {
            return Ok(Vec::new());
        }
        let tasks = sample_tasks(now);
        self.write_collection(TASKS_KEY, &tasks)?;
        info!(count = tasks.len(), path = %self.path_for(TASKS_KEY).display(), "Seeded demo tasks");
        Ok(tasks)
    }

    /// Replace the stored task collection.
    ///
    /// # Errors
    /// Returns an error if the document cannot be written.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        let _guard = self.lock()?;
        self.write_collection(TASKS_KEY, tasks)
    }

    /// Prepend a task, replacing any stored task with the same id.
    ///
    /// # Errors
    /// Returns an error if the document cannot be read or written.
    pub fn insert_task(&self, task: &Task) -> Result<Task> {
        self.modify(TASKS_KEY, |tasks: &mut Vec<Task>| {
            tasks.retain(|existing| existing.id != task.id);
            tasks.insert(0, task.clone());
            debug!(task = %task.id, "Inserted task");
            Ok(task.clone())
        })
    }

    /// Merge `patch` into the stored task and stamp it at `at`.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::TaskNotFound`] for an unknown id and
    /// [`LocalStoreError::Invalid`] when the patch is rejected.
    pub fn update_task(&self, id: &TaskId, patch: &TaskPatch, at: OffsetDateTime) -> Result<Task> {
        self.modify(TASKS_KEY, |tasks: &mut Vec<Task>| {
            let slot = tasks
                .iter_mut()
                .find(|task| &task.id == id)
                .ok_or_else(|| LocalStoreError::TaskNotFound(id.to_string()))?;
            let next = patch.apply(slot, at)?;
            slot.clone_from(&next);
            debug!(task = %id, "Updated task");
            Ok(next)
        })
    }

    /// Remove a task. Returns whether a task was removed; unknown ids are not an error.
    ///
    /// # Errors
    /// Returns an error if the document cannot be read or written.
    pub fn remove_task(&self, id: &TaskId) -> Result<bool> {
        self.modify(TASKS_KEY, |tasks: &mut Vec<Task>| {
            let before = tasks.len();
            tasks.retain(|task| &task.id != id);
            let removed = tasks.len() != before;
            debug!(task = %id, removed, "Removed task");
            Ok(removed)
        })
    }

    /// Append a comment to a stored task.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::TaskNotFound`] for an unknown id.
    pub fn append_comment(&self, id: &TaskId, comment: &Comment) -> Result<Task> {
        self.modify(TASKS_KEY, |tasks: &mut Vec<Task>| {
            let task = tasks
                .iter_mut()
                .find(|task| &task.id == id)
                .ok_or_else(|| LocalStoreError::TaskNotFound(id.to_string()))?;
            task.push_comment(comment.clone());
            debug!(task = %id, comment = %comment.id, "Appended comment");
            Ok(task.clone())
        })
    }

    /// Load the notes collection. A missing document yields an empty list.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::Decode`] for a corrupt document, or an I/O error.
    pub fn load_notes(&self) -> Result<Vec<Note>> {
        let _guard = self.lock()?;
        let notes = self.read_or_quarantine(NOTES_KEY)?.unwrap_or_default();
        debug!(count = notes.len(), "Loaded notes");
        Ok(notes)
    }

    /// Prepend a note, replacing any stored note with the same id.
    ///
    /// # Errors
    /// Returns an error if the document cannot be read or written.
    pub fn insert_note(&self, note: &Note) -> Result<Note> {
        self.modify(NOTES_KEY, |notes: &mut Vec<Note>| {
            notes.retain(|existing| existing.id != note.id);
            notes.insert(0, note.clone());
            Ok(note.clone())
        })
    }

    /// Merge `patch` into the stored note and stamp it at `at`.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::NoteNotFound`] for an unknown id and
    /// [`LocalStoreError::Invalid`] when the patch is rejected.
    pub fn update_note(&self, id: &NoteId, patch: &NotePatch, at: OffsetDateTime) -> Result<Note> {
        self.modify(NOTES_KEY, |notes: &mut Vec<Note>| {
            let slot = notes
                .iter_mut()
                .find(|note| &note.id == id)
                .ok_or_else(|| LocalStoreError::NoteNotFound(id.to_string()))?;
            let next = patch.apply(slot, at)?;
            slot.clone_from(&next);
            Ok(next)
        })
    }

    /// Remove a note. Returns whether a note was removed.
    ///
    /// # Errors
    /// Returns an error if the document cannot be read or written.
    pub fn remove_note(&self, id: &NoteId) -> Result<bool> {
        self.modify(NOTES_KEY, |notes: &mut Vec<Note>| {
            let before = notes.len();
            notes.retain(|note| &note.id != id);
            Ok(notes.len() != before)
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| LocalStoreError::LockError)
    }

    fn modify<T, R>(&self, key: &str, f: impl FnOnce(&mut Vec<T>) -> Result<R>) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.lock()?;
        let mut items = self.read_collection(key)?.unwrap_or_default();
        let out = f(&mut items)?;
        self.write_collection(key, &items)?;
        Ok(out)
    }

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        let path = self.path_for(key);
        let body = match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| LocalStoreError::Decode { path, source })
    }

    fn read_or_quarantine<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        match self.read_collection(key) {
            Err(LocalStoreError::Decode { path, source }) => {
                let aside = path.with_extension(format!("json.{CORRUPT_SUFFIX}"));
                fs::rename(&path, &aside)?;
                warn!(path = %path.display(), moved_to = %aside.display(), error = %source, "Quarantined corrupt document");
                Err(LocalStoreError::Decode { path, source })
            }
            other => other,
        }
    }

    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let body = serde_json::to_vec(items)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key))?;
        Ok(())
    }
}
