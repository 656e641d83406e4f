//! Filter predicates over the task collection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::state::{Priority, Status};
use crate::task::Task;
use crate::text_matcher::TextMatcher;

/// Width of the `week` bucket in days, counted from today inclusive.
pub const WEEK_WINDOW_DAYS: i64 = 7;
/// Width of the `month` bucket in days, counted from today inclusive.
pub const MONTH_WINDOW_DAYS: i64 = 30;

/// Relative due-date window.
///
/// `Week` and `Month` are fixed forward windows from today, not calendar-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueBucket {
    /// Due on the current calendar day.
    Today,
    /// Due between today and today + 7 days.
    Week,
    /// Due between today and today + 30 days.
    Month,
    /// Due before today.
    Overdue,
}

impl DueBucket {
    /// Token used in configuration and user input.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Overdue => "overdue",
        }
    }

    /// Whether `due` falls into the bucket relative to `now`.
    ///
    /// Both instants are compared as calendar days in the offset of `now`.
    #[must_use]
    pub fn contains(self, due: OffsetDateTime, now: OffsetDateTime) -> bool {
        let today = now.date();
        let day = due.to_offset(now.offset()).date();
        let within = |days: i64| {
            day >= today
                && today
                    .checked_add(Duration::days(days))
                    .is_none_or(|limit| day <= limit)
        };
        match self {
            Self::Today => day == today,
            Self::Week => within(WEEK_WINDOW_DAYS),
            Self::Month => within(MONTH_WINDOW_DAYS),
            Self::Overdue => day < today,
        }
    }
}

/// Inclusion filter over tasks. Empty dimensions do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Free-text query over title, description and tags.
    pub search: Option<String>,
    /// At least one of these must be a substring of some task tag.
    ///
    /// An empty entry is a substring of every tag, so it admits any tagged task.
    pub tags: Vec<String>,
    /// Allowed statuses.
    pub status: BTreeSet<Status>,
    /// Allowed priorities.
    pub priority: BTreeSet<Priority>,
    /// Optional due-date bucket.
    pub due: Option<DueBucket>,
}

impl TaskFilter {
    /// Returns true when no dimension is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().is_none_or(str::is_empty)
            && self.tags.is_empty()
            && self.status.is_empty()
            && self.priority.is_empty()
            && self.due.is_none()
    }

    /// Evaluate the filter against a task, using `now` to resolve due buckets.
    ///
    /// Dimensions are checked in order search, tags, status, priority, due date and
    /// the first failing one short-circuits.
    #[must_use]
    pub fn matches(&self, task: &Task, now: OffsetDateTime) -> bool {
        if let Some(matcher) = self.search.as_deref().and_then(TextMatcher::new)
            && !matcher.matches_task(task)
        {
            return false;
        }

        if !self.tags.is_empty() && !self.matches_tags(task) {
            return false;
        }

        if !self.status.is_empty() && !self.status.contains(&task.status) {
            return false;
        }

        if !self.priority.is_empty() && !self.priority.contains(&task.priority) {
            return false;
        }

        if let Some(bucket) = self.due {
            return task.due_date.is_some_and(|due| bucket.contains(due, now));
        }

        true
    }

    /// Apply the filter to a sequence, keeping the input order.
    pub fn apply<'a, I>(&'a self, tasks: I, now: OffsetDateTime) -> impl Iterator<Item = &'a Task> + 'a
    where
        I: IntoIterator<Item = &'a Task>,
        I::IntoIter: 'a,
    {
        tasks.into_iter().filter(move |task| self.matches(task, now))
    }

    fn matches_tags(&self, task: &Task) -> bool {
        self.tags
            .iter()
            .map(|tag| TextMatcher::substring(tag))
            .any(|matcher| task.tags.iter().any(|task_tag| matcher.matches_field(task_tag)))
    }
}
