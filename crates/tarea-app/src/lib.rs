//! Application layer for tarea.
//!
//! This crate owns the task store, the persistence adapters it talks to,
//! configuration, notes and the pomodoro driver shared by front ends.

pub mod adapter;
pub mod config;
pub mod filter_util;
pub mod note_store;
pub mod pomodoro;
pub mod session;
pub mod task_cache;
pub mod task_patch;
pub mod task_store;
pub mod telemetry;

// Re-exports for convenience
pub use adapter::{AdapterError, Backend, TaskAdapter};
pub use config::{AppConfig, BackendKind, BoardConfig, LocalConfig, PomodoroConfig, RemoteConfig, StorageConfig};
pub use filter_util::{
    FilterBuildError, TaskFilterBuilder, parse_due_bucket, parse_priority_tokens, parse_status_tokens,
};
pub use note_store::{NoteStore, NoteStoreError};
pub use pomodoro::{TimerEvent, drive, record_completion};
pub use task_cache::{Board, BoardColumn, TaskCollection};
pub use task_patch::{SetDiff, TaskEditData, diff_sets};
pub use task_store::{StoreEvent, StoreState, TaskStore, TaskStoreError};
pub use telemetry::install_tracing;
