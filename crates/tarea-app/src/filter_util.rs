use std::fmt::{self, Display};

use tarea_core::{DueBucket, Priority, Status, TaskFilter};
use thiserror::Error;

/// Error type returned while constructing task filters from user-facing inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterBuildError {
    #[error("invalid status: {token}")]
    InvalidStatus { token: String },
    #[error("invalid priority: {token}")]
    InvalidPriority { token: String },
    #[error("invalid due bucket: {token}")]
    InvalidDueBucket { token: String },
}

/// Result alias for filter construction helpers.
pub type FilterBuildResult<T> = Result<T, FilterBuildError>;

/// Builder that accepts user-facing strings and normalizes them into [`TaskFilter`] values.
#[derive(Debug, Clone, Default)]
pub struct TaskFilterBuilder {
    search: Option<String>,
    tags: Vec<String>,
    statuses: Vec<Status>,
    priorities: Vec<Priority>,
    due: Option<DueBucket>,
}

impl TaskFilterBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the optional search text (whitespace-only inputs become `None`).
    #[must_use]
    pub fn with_search(mut self, text: Option<String>) -> Self {
        self.search = text.and_then(|raw| {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });
        self
    }

    /// Extend the tag list (logical OR, substring match). Blank tags are skipped.
    #[must_use]
    pub fn with_tags(mut self, tags: &[String]) -> Self {
        self.tags.extend(
            tags.iter()
                .map(|tag| tag.trim())
                .filter(|tag| !tag.is_empty())
                .map(str::to_string),
        );
        self
    }

    /// Extend the allowed statuses.
    ///
    /// # Errors
    /// Returns an error if any token does not name a status.
    pub fn with_statuses(mut self, tokens: &[String]) -> FilterBuildResult<Self> {
        self.statuses.extend(parse_status_tokens(tokens)?);
        Ok(self)
    }

    /// Extend the allowed priorities.
    ///
    /// # Errors
    /// Returns an error if any token does not name a priority.
    pub fn with_priorities(mut self, tokens: &[String]) -> FilterBuildResult<Self> {
        self.priorities.extend(parse_priority_tokens(tokens)?);
        Ok(self)
    }

    /// Configure the due-date bucket; blank input clears it.
    ///
    /// # Errors
    /// Returns an error if the token does not name a bucket.
    pub fn with_due(mut self, token: Option<&str>) -> FilterBuildResult<Self> {
        self.due = match token.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(parse_due_bucket(raw)?),
            None => None,
        };
        Ok(self)
    }

    /// Build the final [`TaskFilter`].
    #[must_use]
    pub fn build(self) -> TaskFilter {
        TaskFilter {
            search: self.search,
            tags: self.tags,
            status: self.statuses.into_iter().collect(),
            priority: self.priorities.into_iter().collect(),
            due: self.due,
        }
    }
}

/// Convert arbitrary tokens into [`Status`] values.
///
/// # Errors
/// Returns an error if any token does not match a status.
pub fn parse_status_tokens(tokens: &[String]) -> FilterBuildResult<Vec<Status>> {
    tokens
        .iter()
        .map(|token| match normalize(token).as_str() {
            "todo" | "to_do" => Ok(Status::Todo),
            "progress" | "in_progress" | "inprogress" => Ok(Status::Progress),
            "done" => Ok(Status::Done),
            _ => Err(FilterBuildError::InvalidStatus {
                token: token.to_string(),
            }),
        })
        .collect()
}

/// Convert arbitrary tokens into [`Priority`] values.
///
/// # Errors
/// Returns an error if any token does not match a priority.
pub fn parse_priority_tokens(tokens: &[String]) -> FilterBuildResult<Vec<Priority>> {
    tokens
        .iter()
        .map(|token| match normalize(token).as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(FilterBuildError::InvalidPriority {
                token: token.to_string(),
            }),
        })
        .collect()
}

/// Parse a due bucket token (`today`, `week`, `month`, `overdue`).
///
/// # Errors
/// Returns an error for any other token.
pub fn parse_due_bucket(token: &str) -> FilterBuildResult<DueBucket> {
    match normalize(token).as_str() {
        "today" => Ok(DueBucket::Today),
        "week" | "this_week" => Ok(DueBucket::Week),
        "month" | "this_month" => Ok(DueBucket::Month),
        "overdue" => Ok(DueBucket::Overdue),
        _ => Err(FilterBuildError::InvalidDueBucket {
            token: token.to_string(),
        }),
    }
}

fn normalize(token: &str) -> String {
    token.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

impl FilterBuildError {
    /// Convert the error into a message that is friendly for end-users.
    #[must_use]
    pub fn describe_user_facing(&self) -> String {
        match self {
            Self::InvalidStatus { token } => {
                format!("Unknown status \"{token}\" (expected todo, progress or done)")
            }
            Self::InvalidPriority { token } => {
                format!("Unknown priority \"{token}\" (expected low, medium or high)")
            }
            Self::InvalidDueBucket { token } => {
                format!("Unknown due date filter \"{token}\" (expected today, week, month or overdue)")
            }
        }
    }
}

impl Display for TaskFilterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFilterBuilder")
            .field("search", &self.search)
            .field("tags", &self.tags)
            .field("statuses", &self.statuses)
            .field("priorities", &self.priorities)
            .field("due", &self.due)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Display;

    use super::*;

    fn ok<T, E: Display>(result: Result<T, E>, context: &str) -> T {
        result.unwrap_or_else(|err| panic!("{context}: {err}"))
    }

    #[test]
    fn test_parse_status_tokens() {
        let tokens = vec!["todo".into(), "In-Progress ".into(), "DONE".into(), "progress".into()];
        let parsed = ok(parse_status_tokens(&tokens), "parse statuses");
        assert_eq!(
            parsed,
            vec![Status::Todo, Status::Progress, Status::Done, Status::Progress]
        );
    }

    #[test]
    fn test_parse_priority_rejects_unknown() {
        let tokens = vec!["high".into(), "urgent".into()];
        let err = parse_priority_tokens(&tokens).err();
        assert_eq!(
            err,
            Some(FilterBuildError::InvalidPriority {
                token: "urgent".into()
            })
        );
    }

    #[test]
    fn test_parse_due_bucket() {
        assert_eq!(ok(parse_due_bucket(" Week"), "week"), DueBucket::Week);
        assert_eq!(ok(parse_due_bucket("overdue"), "overdue"), DueBucket::Overdue);
        assert!(parse_due_bucket("yesterday").is_err());
    }

    #[test]
    fn test_blank_inputs_do_not_restrict() {
        let filter = ok(
            TaskFilterBuilder::new()
                .with_search(Some("   ".into()))
                .with_tags(&[String::from(" ")])
                .with_due(Some("")),
            "blank due",
        )
        .build();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_filter_builder_full_workflow() {
        let filter = ok(
            ok(
                TaskFilterBuilder::new()
                    .with_search(Some(" Landing ".into()))
                    .with_tags(&[String::from("design")])
                    .with_statuses(&[String::from("todo"), String::from("progress")]),
                "statuses",
            )
            .with_priorities(&[String::from("High")]),
            "priorities",
        );
        let filter = ok(filter.with_due(Some("today")), "due").build();

        assert_eq!(filter.search.as_deref(), Some("Landing"));
        assert_eq!(filter.tags, ["design"]);
        assert!(filter.status.contains(&Status::Todo));
        assert!(filter.status.contains(&Status::Progress));
        assert!(!filter.status.contains(&Status::Done));
        assert!(filter.priority.contains(&Priority::High));
        assert_eq!(filter.due, Some(DueBucket::Today));
    }

    #[test]
    fn test_user_facing_message_names_token() {
        let err = FilterBuildError::InvalidStatus { token: "blocked".into() };
        assert!(err.describe_user_facing().contains("\"blocked\""));
    }
}
