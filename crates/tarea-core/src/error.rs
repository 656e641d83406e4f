//! Validation errors raised by the domain model.

use thiserror::Error;

/// Errors produced while validating domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Task title was empty or whitespace only.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// Comment content was empty or whitespace only.
    #[error("comment content must not be empty")]
    EmptyComment,

    /// Note title or content was blank.
    #[error("note title and content must not be empty")]
    EmptyNote,

    /// Custom recurrence without a positive day count.
    #[error("custom recurrence requires a positive day count")]
    InvalidRecurrence,
}
