//! Domain model for tarea: tasks, filters, notes and the pomodoro timer.

/// Time source abstraction.
pub mod clock;
/// Validation errors.
pub mod error;
/// Filter predicates.
pub mod filter;
/// Identifier types.
pub mod id;
/// Notes model.
pub mod note;
/// Partial task updates.
pub mod patch;
/// Pomodoro countdown.
pub mod pomodoro;
/// Status and priority enums.
pub mod state;
/// Task entities.
pub mod task;
/// Case-insensitive text search.
pub mod text_matcher;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::CoreError;
pub use filter::{DueBucket, TaskFilter};
pub use id::{CommentId, NoteId, TaskId};
pub use note::{Note, NoteDraft, NoteFilter, NotePatch};
pub use patch::{FieldPatch, TaskPatch};
pub use pomodoro::{PomodoroSettings, PomodoroTimer, SessionCompleted, SessionKind};
pub use state::{Priority, Status};
pub use task::{Comment, Recurrence, RecurrenceInterval, Task, TaskDraft, UserRef};
