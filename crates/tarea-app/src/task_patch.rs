use std::collections::BTreeSet;

use tarea_core::{FieldPatch, Priority, Status, Task, TaskPatch};
use time::OffsetDateTime;

/// Difference between two sets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SetDiff<T> {
    /// Entries present in the desired set but missing from the current set.
    pub added: Vec<T>,
    /// Entries present in the current set but removed from the desired set.
    pub removed: Vec<T>,
}

impl<T> SetDiff<T> {
    /// Returns true when both added/removed are empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compute differences between two sets.
#[must_use]
pub fn diff_sets<T: Ord + Clone>(current: &BTreeSet<T>, desired: &BTreeSet<T>) -> SetDiff<T> {
    SetDiff {
        added: desired.difference(current).cloned().collect(),
        removed: current.difference(desired).cloned().collect(),
    }
}

/// Full desired state of a task edit form.
#[derive(Debug, Clone)]
pub struct TaskEditData {
    /// Desired title.
    pub title: String,
    /// Desired description (blank clears).
    pub description: String,
    /// Desired status.
    pub status: Status,
    /// Desired priority.
    pub priority: Priority,
    /// Desired tags in display order.
    pub tags: Vec<String>,
    /// Desired due date (`None` clears).
    pub due_date: Option<OffsetDateTime>,
}

impl TaskEditData {
    /// Prefill the form from an existing task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            tags: task.tags.clone(),
            due_date: task.due_date,
        }
    }

    /// Tag additions and removals relative to `task`.
    #[must_use]
    pub fn tag_diff(&self, task: &Task) -> SetDiff<String> {
        let current: BTreeSet<String> = task.tags.iter().cloned().collect();
        let desired: BTreeSet<String> = normalized_tags(&self.tags).into_iter().collect();
        diff_sets(&current, &desired)
    }

    /// Compute a patch carrying only the fields that differ from `task`.
    #[must_use]
    pub fn into_patch(self, task: &Task) -> TaskPatch {
        let tag_diff = self.tag_diff(task);
        let Self {
            title,
            description,
            status,
            priority,
            tags,
            due_date,
        } = self;

        let mut patch = TaskPatch::default();

        let title = title.trim();
        if title != task.title {
            patch.title = Some(title.to_string());
        }

        let description = description.trim();
        patch.description = match (task.description.as_deref(), description.is_empty()) {
            (Some(_), true) => Some(FieldPatch::Clear),
            (None, true) => None,
            (Some(old), false) if old == description => None,
            (_, false) => Some(FieldPatch::Set(description.to_string())),
        };

        if status != task.status {
            patch.status = Some(status);
        }
        if priority != task.priority {
            patch.priority = Some(priority);
        }

        let tags = normalized_tags(&tags);
        if !tag_diff.is_empty() || tags != task.tags {
            patch.tags = Some(tags);
        }

        patch.due_date = match (task.due_date, due_date) {
            (Some(old), Some(new)) if old == new => None,
            (_, Some(new)) => Some(FieldPatch::Set(new)),
            (Some(_), None) => Some(FieldPatch::Clear),
            (None, None) => None,
        };

        patch
    }
}

/// Trim tags, drop blanks and duplicates, keep first-seen order.
fn normalized_tags(tags: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty() && seen.insert(*tag))
        .map(str::to_string)
        .collect()
}
