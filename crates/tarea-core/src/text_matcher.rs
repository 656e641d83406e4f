use crate::note::Note;
use crate::task::Task;

/// Case-insensitive substring matcher for task and note fields.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Matcher for a search box. Returns `None` for an empty query, which restricts nothing.
    ///
    /// The query is not trimmed: surrounding spaces are part of the substring.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        (!query.is_empty()).then(|| Self::substring(query))
    }

    /// Matcher for any query, including the empty one, which every value contains.
    #[must_use]
    pub fn substring(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }

    /// Whether the title, the description or any tag contains the query.
    #[must_use]
    pub fn matches_task(&self, task: &Task) -> bool {
        self.matches_field(&task.title)
            || task
                .description
                .as_deref()
                .is_some_and(|description| self.matches_field(description))
            || task.tags.iter().any(|tag| self.matches_field(tag))
    }

    /// Whether the note title or content contains the query.
    #[must_use]
    pub fn matches_note(&self, note: &Note) -> bool {
        self.matches_field(&note.title) || self.matches_field(&note.content)
    }

    /// Whether a single value contains the query.
    #[must_use]
    pub fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}
