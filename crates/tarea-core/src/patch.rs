//! Partial task updates.

use time::OffsetDateTime;

use crate::error::CoreError;
use crate::state::{Priority, Status};
use crate::task::{Recurrence, Task, validate_title};

/// Set-or-clear change for an optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// Overwrite with a new value.
    Set(T),
    /// Remove the value.
    Clear,
}

impl<T: Clone> FieldPatch<T> {
    fn apply_to(&self, target: &mut Option<T>) {
        *target = match self {
            Self::Set(value) => Some(value.clone()),
            Self::Clear => None,
        };
    }

    /// The value being set, `None` for a clear.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Clear => None,
        }
    }
}

/// Partial changes merged over an existing task.
///
/// `None` leaves a field untouched. Comments are not part of a patch; they are
/// appended through their own command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    /// Replace the title.
    pub title: Option<String>,
    /// Set or clear the description.
    pub description: Option<FieldPatch<String>>,
    /// Replace the status.
    pub status: Option<Status>,
    /// Replace the priority.
    pub priority: Option<Priority>,
    /// Replace the tag list.
    pub tags: Option<Vec<String>>,
    /// Set or clear the due date.
    pub due_date: Option<FieldPatch<OffsetDateTime>>,
    /// Set or clear the recurrence.
    pub recurring: Option<FieldPatch<Recurrence>>,
    /// Set or clear the pomodoro count.
    pub pomodoro_count: Option<FieldPatch<u32>>,
}

impl TaskPatch {
    /// Patch that only moves the task to another status.
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Returns true when the patch would change no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.due_date.is_none()
            && self.recurring.is_none()
            && self.pomodoro_count.is_none()
    }

    /// Check the values carried by the patch.
    ///
    /// # Errors
    /// Returns a [`CoreError`] for a blank title or an invalid recurrence.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(FieldPatch::Set(recurring)) = &self.recurring {
            recurring.validate()?;
        }
        Ok(())
    }

    /// Merge the patch over `task` and stamp `updated_at` with `at`.
    ///
    /// The stamp is applied even for an empty patch and never precedes `created_at`.
    ///
    /// # Errors
    /// Returns a [`CoreError`] when validation fails.
    pub fn apply(&self, task: &Task, at: OffsetDateTime) -> Result<Task, CoreError> {
        self.validate()?;
        let mut next = task.clone();
        if let Some(title) = &self.title {
            next.title = validate_title(title)?;
        }
        if let Some(description) = &self.description {
            description.apply_to(&mut next.description);
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(tags) = &self.tags {
            next.tags.clone_from(tags);
        }
        if let Some(due_date) = &self.due_date {
            due_date.apply_to(&mut next.due_date);
        }
        if let Some(recurring) = &self.recurring {
            recurring.apply_to(&mut next.recurring);
        }
        if let Some(count) = &self.pomodoro_count {
            count.apply_to(&mut next.pomodoro_count);
        }
        next.touch(at);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;
    use crate::task::TaskDraft;
    use time::macros::datetime;

    fn task() -> Task {
        TaskDraft {
            description: Some("desc".into()),
            tags: vec!["Web".into()],
            due_date: Some(datetime!(2024-01-12 00:00 UTC)),
            ..TaskDraft::new("Initial")
        }
        .into_task(TaskId::from("7"), datetime!(2024-01-10 00:00 UTC))
        .unwrap_or_else(|err| panic!("draft must be valid: {err}"))
    }

    #[test]
    fn apply_merges_fields_and_stamps_updated_at() {
        let patch = TaskPatch {
            title: Some(" Renamed ".into()),
            description: Some(FieldPatch::Clear),
            status: Some(Status::Done),
            tags: Some(vec!["Docs".into()]),
            due_date: Some(FieldPatch::Clear),
            pomodoro_count: Some(FieldPatch::Set(2)),
            ..TaskPatch::default()
        };
        let at = datetime!(2024-01-11 12:00 UTC);
        let next = patch
            .apply(&task(), at)
            .unwrap_or_else(|err| panic!("patch must apply: {err}"));

        assert_eq!(next.title, "Renamed");
        assert!(next.description.is_none());
        assert_eq!(next.status, Status::Done);
        assert_eq!(next.priority, Priority::Medium);
        assert_eq!(next.tags, vec!["Docs"]);
        assert!(next.due_date.is_none());
        assert_eq!(next.pomodoro_count, Some(2));
        assert_eq!(next.updated_at, at);
        assert_eq!(next.created_at, datetime!(2024-01-10 00:00 UTC));
    }

    #[test]
    fn empty_patch_still_stamps() {
        let patch = TaskPatch::default();
        assert!(patch.is_empty());
        let at = datetime!(2024-01-10 00:00:05 UTC);
        let next = patch
            .apply(&task(), at)
            .unwrap_or_else(|err| panic!("patch must apply: {err}"));
        assert_eq!(next.updated_at, at);
    }

    #[test]
    fn blank_title_is_rejected() {
        let patch = TaskPatch {
            title: Some("  ".into()),
            ..TaskPatch::default()
        };
        assert_eq!(
            patch.apply(&task(), OffsetDateTime::UNIX_EPOCH).err(),
            Some(CoreError::EmptyTitle)
        );
    }

    #[test]
    fn stamp_never_precedes_creation() {
        let next = TaskPatch::status(Status::Progress)
            .apply(&task(), datetime!(2000-01-01 00:00 UTC))
            .unwrap_or_else(|err| panic!("patch must apply: {err}"));
        assert!(next.updated_at >= next.created_at);
    }
}
