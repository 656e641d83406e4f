//! Task, comment and recurrence entities.

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::error::CoreError;
use crate::id::{CommentId, TaskId};
use crate::state::{Priority, Status};

/// A trackable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier, immutable after creation.
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Workflow column.
    #[serde(default)]
    pub status: Status,
    /// Relative importance.
    #[serde(default)]
    pub priority: Priority,
    /// Labels in display order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional due instant.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<OffsetDateTime>,
    /// Creation instant, never changed afterwards.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Instant of the latest mutation.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Append-only discussion.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Recurrence metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<Recurrence>,
    /// Number of focus sessions spent on the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoro_count: Option<u32>,
}

impl Task {
    /// Append a comment and stamp the task as modified at the comment's timestamp.
    pub fn push_comment(&mut self, comment: Comment) {
        self.touch(comment.timestamp);
        self.comments.push(comment);
    }

    /// Refresh `updated_at`, never moving it before `created_at`.
    pub fn touch(&mut self, at: OffsetDateTime) {
        self.updated_at = at.max(self.created_at);
    }

    /// Whether the task carries the given tag (exact match).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing == tag)
    }
}

/// Reference to the author of a comment on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Service-side user id, when the service exposes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Contact email, when exposed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A comment attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: CommentId,
    /// Non-empty body.
    pub content: String,
    /// Creation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Author, only known when backed by an authenticated service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
}

impl Comment {
    /// Create a local comment with a fresh identifier.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyComment`] when `content` is blank.
    pub fn new(content: &str, timestamp: OffsetDateTime) -> Result<Self, CoreError> {
        let content = validate_comment(content)?;
        Ok(Self {
            id: CommentId::generate(),
            content,
            timestamp,
            user: None,
        })
    }
}

/// Validate a comment body and return it trimmed.
///
/// # Errors
/// Returns [`CoreError::EmptyComment`] when `content` is blank.
pub fn validate_comment(content: &str) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyComment);
    }
    Ok(trimmed.to_owned())
}

/// Validate a task title and return it trimmed.
///
/// # Errors
/// Returns [`CoreError::EmptyTitle`] when `title` is blank.
pub fn validate_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

/// How often a recurring task comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceInterval {
    /// Every day.
    Daily,
    /// Every seven days.
    Weekly,
    /// Same day next calendar month.
    Monthly,
    /// Every `custom_days` days.
    Custom,
}

/// Recurrence metadata of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    /// Repeat interval.
    pub interval: RecurrenceInterval,
    /// Day count for [`RecurrenceInterval::Custom`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_days: Option<u32>,
    /// When the last occurrence was created.
    #[serde(with = "time::serde::rfc3339")]
    pub last_created: OffsetDateTime,
}

impl Recurrence {
    /// Check that custom intervals carry a positive day count.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidRecurrence`] for a custom interval without days.
    pub const fn validate(&self) -> Result<(), CoreError> {
        match (self.interval, self.custom_days) {
            (RecurrenceInterval::Custom, None | Some(0)) => Err(CoreError::InvalidRecurrence),
            _ => Ok(()),
        }
    }

    /// Instant at which the next occurrence is due, `None` when invalid or out of range.
    #[must_use]
    pub fn next_occurrence(&self) -> Option<OffsetDateTime> {
        let last = self.last_created;
        match self.interval {
            RecurrenceInterval::Daily => last.checked_add(Duration::days(1)),
            RecurrenceInterval::Weekly => last.checked_add(Duration::days(7)),
            RecurrenceInterval::Monthly => add_one_month(last.date()).map(|date| last.replace_date(date)),
            RecurrenceInterval::Custom => match self.custom_days {
                Some(days) if days > 0 => last.checked_add(Duration::days(i64::from(days))),
                _ => None,
            },
        }
    }
}

fn add_one_month(date: Date) -> Option<Date> {
    let month = date.month().next();
    let year = if month == time::Month::January {
        date.year().checked_add(1)?
    } else {
        date.year()
    };
    let day = date.day();
    if day <= 28 {
        return Date::from_calendar_date(year, month, day).ok();
    }
    // Clamp to the last day of the target month.
    (28..=day)
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())
}

/// A task as submitted by the caller, before identity and timestamps are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    /// Title (validated non-empty).
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Initial status.
    pub status: Status,
    /// Initial priority.
    pub priority: Priority,
    /// Initial tags.
    pub tags: Vec<String>,
    /// Optional due instant.
    pub due_date: Option<OffsetDateTime>,
    /// Optional recurrence.
    pub recurring: Option<Recurrence>,
    /// Optional pomodoro count.
    pub pomodoro_count: Option<u32>,
}

impl TaskDraft {
    /// Draft with the given title and default fields.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Validate the draft.
    ///
    /// # Errors
    /// Returns a [`CoreError`] for a blank title or an invalid recurrence.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title(&self.title)?;
        if let Some(recurring) = &self.recurring {
            recurring.validate()?;
        }
        Ok(())
    }

    /// Materialize the draft into a task with the given identity and creation instant.
    ///
    /// # Errors
    /// Returns a [`CoreError`] when validation fails.
    pub fn into_task(self, id: TaskId, now: OffsetDateTime) -> Result<Task, CoreError> {
        self.validate()?;
        let title = validate_title(&self.title)?;
        Ok(Task {
            id,
            title,
            description: self.description.filter(|text| !text.trim().is_empty()),
            status: self.status,
            priority: self.priority,
            tags: self.tags,
            due_date: self.due_date,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
            recurring: self.recurring,
            pomodoro_count: self.pomodoro_count,
        })
    }
}
