//! Free-form notes kept next to the task list.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::CoreError;
use crate::id::NoteId;
use crate::text_matcher::TextMatcher;

/// A titled note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Identifier.
    pub id: NoteId,
    /// Title line.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Creation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Instant of the latest edit.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields supplied when creating a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    /// Title line.
    pub title: String,
    /// Body text.
    pub content: String,
}

impl NoteDraft {
    /// Materialize the draft, trimming both fields.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyNote`] when the title or content is blank.
    pub fn into_note(self, id: NoteId, now: OffsetDateTime) -> Result<Note, CoreError> {
        let title = non_blank(&self.title)?;
        let content = non_blank(&self.content)?;
        Ok(Note {
            id,
            title,
            content,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial edit of a note.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotePatch {
    /// Replace the title.
    pub title: Option<String>,
    /// Replace the content.
    pub content: Option<String>,
}

impl NotePatch {
    /// Merge the patch and stamp `updated_at`.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyNote`] when a replacement is blank.
    pub fn apply(&self, note: &Note, at: OffsetDateTime) -> Result<Note, CoreError> {
        let mut next = note.clone();
        if let Some(title) = &self.title {
            next.title = non_blank(title)?;
        }
        if let Some(content) = &self.content {
            next.content = non_blank(content)?;
        }
        next.updated_at = at.max(next.created_at);
        Ok(next)
    }
}

/// Search filter for notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Free-text query over title and content.
    pub search: Option<String>,
}

impl NoteFilter {
    /// Whether the note satisfies the filter.
    #[must_use]
    pub fn matches(&self, note: &Note) -> bool {
        self.search
            .as_deref()
            .and_then(TextMatcher::new)
            .is_none_or(|matcher| matcher.matches_note(note))
    }
}

fn non_blank(value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyNote);
    }
    Ok(trimmed.to_owned())
}
