//! JSON shapes exchanged with the task service.
//!
//! The service keys records by integer ids and uses snake_case field names.
//! Readers also accept the camelCase spellings some deployments emit.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tarea_core::{
    Comment, CommentId, Priority, Recurrence, RecurrenceInterval, Status, Task, TaskId, TaskPatch, UserRef,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Identifier as sent by the service: integer in practice, text tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    /// Integer primary key.
    Int(i64),
    /// Opaque text key.
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

/// Task as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    id: WireId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Status,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, alias = "dueDate", with = "time::serde::rfc3339::option")]
    due_date: Option<OffsetDateTime>,
    #[serde(alias = "createdAt", with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(alias = "updatedAt", with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
    #[serde(default)]
    comments: Vec<CommentRecord>,
    #[serde(default)]
    recurring: Option<RecurrenceRecord>,
    #[serde(default, alias = "pomodoroCount")]
    pomodoro_count: Option<u32>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let mut task = Self {
            id: TaskId::from(record.id.into_string()),
            title: record.title,
            description: record.description.filter(|text| !text.is_empty()),
            status: record.status,
            priority: record.priority,
            tags: record.tags,
            due_date: record.due_date,
            created_at: record.created_at,
            updated_at: record.created_at,
            comments: record.comments.into_iter().map(Comment::from).collect(),
            recurring: record.recurring.map(Recurrence::from),
            pomodoro_count: record.pomodoro_count,
        };
        task.touch(record.updated_at);
        task
    }
}

/// Recurrence metadata in service field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRecord {
    interval: RecurrenceInterval,
    #[serde(default, alias = "customDays", skip_serializing_if = "Option::is_none")]
    custom_days: Option<u32>,
    #[serde(alias = "lastCreated", with = "time::serde::rfc3339")]
    last_created: OffsetDateTime,
}

impl From<RecurrenceRecord> for Recurrence {
    fn from(record: RecurrenceRecord) -> Self {
        Self {
            interval: record.interval,
            custom_days: record.custom_days,
            last_created: record.last_created,
        }
    }
}

impl From<&Recurrence> for RecurrenceRecord {
    fn from(recurrence: &Recurrence) -> Self {
        Self {
            interval: recurrence.interval,
            custom_days: recurrence.custom_days,
            last_created: recurrence.last_created,
        }
    }
}

/// Either a paginated envelope or a bare array of tasks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TaskList {
    /// `{"results": [...]}`.
    Page {
        /// Records on this page.
        results: Vec<TaskRecord>,
    },
    /// `[...]`.
    Plain(Vec<TaskRecord>),
}

impl TaskList {
    /// Convert every record into a task, preserving service order.
    #[must_use]
    pub fn into_tasks(self) -> Vec<Task> {
        let records = match self {
            Self::Page { results } => results,
            Self::Plain(records) => records,
        };
        records.into_iter().map(Task::from).collect()
    }
}

/// Comment as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentRecord {
    id: WireId,
    content: String,
    #[serde(alias = "created_at", with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    #[serde(default)]
    user: Option<UserRecord>,
}

impl From<CommentRecord> for Comment {
    fn from(record: CommentRecord) -> Self {
        Self {
            id: CommentId::from(record.id.into_string()),
            content: record.content,
            timestamp: record.timestamp,
            user: record.user.map(UserRef::from),
        }
    }
}

/// Comment author: a full object or only a display string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserRecord {
    /// `{"id": 1, "name": "Ada", "email": "ada@example.invalid"}`.
    Object {
        /// Service-side id.
        #[serde(default)]
        id: Option<WireId>,
        /// Display name.
        name: String,
        /// Contact address.
        #[serde(default)]
        email: Option<String>,
    },
    /// `"Ada"`.
    Name(String),
}

impl From<UserRecord> for UserRef {
    fn from(record: UserRecord) -> Self {
        match record {
            UserRecord::Object { id, name, email } => Self {
                id: id.map(WireId::into_string),
                name,
                email,
            },
            UserRecord::Name(name) => Self {
                id: None,
                name,
                email: None,
            },
        }
    }
}

/// Body of `POST {tasks}`.
#[derive(Debug, Serialize)]
pub struct NewTaskBody<'a> {
    title: &'a str,
    description: &'a str,
    status: Status,
    priority: Priority,
    tags: &'a [String],
    #[serde(with = "time::serde::rfc3339::option")]
    due_date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recurring: Option<RecurrenceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pomodoro_count: Option<u32>,
}

impl<'a> From<&'a Task> for NewTaskBody<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            title: &task.title,
            description: task.description.as_deref().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            tags: &task.tags,
            due_date: task.due_date,
            recurring: task.recurring.as_ref().map(RecurrenceRecord::from),
            pomodoro_count: task.pomodoro_count,
        }
    }
}

/// Body of `PATCH {tasks}{id}/`: only the fields the patch touches.
///
/// # Errors
/// Returns an error if a value cannot be serialized.
pub fn patch_body(patch: &TaskPatch) -> serde_json::Result<Value> {
    let mut body = Map::new();
    if let Some(title) = &patch.title {
        body.insert("title".into(), Value::from(title.trim()));
    }
    if let Some(description) = &patch.description {
        let text = description.value().map_or("", String::as_str);
        body.insert("description".into(), Value::from(text));
    }
    if let Some(status) = patch.status {
        body.insert("status".into(), serde_json::to_value(status)?);
    }
    if let Some(priority) = patch.priority {
        body.insert("priority".into(), serde_json::to_value(priority)?);
    }
    if let Some(tags) = &patch.tags {
        body.insert("tags".into(), serde_json::to_value(tags)?);
    }
    if let Some(due_date) = &patch.due_date {
        body.insert("due_date".into(), timestamp_value(due_date.value())?);
    }
    if let Some(recurring) = &patch.recurring {
        let record = recurring.value().map(RecurrenceRecord::from);
        body.insert("recurring".into(), serde_json::to_value(record)?);
    }
    if let Some(count) = &patch.pomodoro_count {
        body.insert("pomodoro_count".into(), serde_json::to_value(count.value())?);
    }
    Ok(Value::Object(body))
}

/// Body of `POST {tasks}{id}/comments/`.
#[derive(Debug, Serialize)]
pub struct NewCommentBody<'a> {
    /// Comment text.
    pub content: &'a str,
}

fn timestamp_value(value: Option<&OffsetDateTime>) -> serde_json::Result<Value> {
    value.map_or(Ok(Value::Null), |at| {
        at.format(&Rfc3339)
            .map(Value::from)
            .map_err(serde::ser::Error::custom)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tarea_core::FieldPatch;
    use time::macros::datetime;

    fn record(value: Value) -> TaskRecord {
        serde_json::from_value(value).unwrap_or_else(|err| panic!("record must decode: {err}"))
    }

    #[test]
    fn snake_case_record_maps_onto_task() {
        let task = Task::from(record(json!({
            "id": 7,
            "title": "Ship",
            "description": "",
            "status": "progress",
            "priority": "high",
            "tags": ["Release"],
            "due_date": "2024-01-12T12:00:00Z",
            "created_at": "2024-01-10T09:00:00.123456Z",
            "updated_at": "2024-01-11T09:00:00Z",
            "pomodoro_count": 2,
            "comments": [
                {"id": 3, "content": "On it", "timestamp": "2024-01-10T10:00:00Z", "user": "Ada"}
            ]
        })));
        assert_eq!(task.id.as_str(), "7");
        assert_eq!(task.description, None);
        assert_eq!(task.status, Status::Progress);
        assert_eq!(task.due_date, Some(datetime!(2024-01-12 12:00 UTC)));
        assert_eq!(task.updated_at, datetime!(2024-01-11 09:00 UTC));
        assert_eq!(task.pomodoro_count, Some(2));
        assert_eq!(task.comments[0].id.as_str(), "3");
        assert_eq!(task.comments[0].user.as_ref().map(|user| user.name.as_str()), Some("Ada"));
    }

    #[test]
    fn camel_case_aliases_and_defaults_are_accepted() {
        let task = Task::from(record(json!({
            "id": 1,
            "title": "Defaults",
            "dueDate": null,
            "createdAt": "2024-01-10T09:00:00Z",
            "updatedAt": "2024-01-10T09:00:00Z"
        })));
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.tags.is_empty() && task.comments.is_empty());
    }

    #[test]
    fn updated_at_never_precedes_created_at() {
        let task = Task::from(record(json!({
            "id": 1,
            "title": "Skewed clock",
            "created_at": "2024-01-10T09:00:00Z",
            "updated_at": "2024-01-09T09:00:00Z"
        })));
        assert_eq!(task.updated_at, task.created_at);
    }

    #[test]
    fn user_object_keeps_identity() {
        let comment: CommentRecord = serde_json::from_value(json!({
            "id": 1,
            "content": "hi",
            "timestamp": "2024-01-10T09:00:00Z",
            "user": {"id": 5, "name": "Ada", "email": "ada@example.invalid"}
        }))
        .unwrap_or_else(|err| panic!("comment must decode: {err}"));
        let user = Comment::from(comment).user;
        assert_eq!(
            user,
            Some(UserRef {
                id: Some("5".into()),
                name: "Ada".into(),
                email: Some("ada@example.invalid".into()),
            })
        );
    }

    #[test]
    fn paginated_and_plain_lists_decode() {
        let item = json!({"id": 1, "title": "x", "created_at": "2024-01-10T09:00:00Z", "updated_at": "2024-01-10T09:00:00Z"});
        let plain: TaskList = serde_json::from_value(json!([item.clone()]))
            .unwrap_or_else(|err| panic!("plain list: {err}"));
        let page: TaskList = serde_json::from_value(json!({"count": 1, "results": [item]}))
            .unwrap_or_else(|err| panic!("page: {err}"));
        assert_eq!(plain.into_tasks().len(), 1);
        assert_eq!(page.into_tasks().len(), 1);
    }

    #[test]
    fn patch_body_only_carries_touched_fields() {
        let patch = TaskPatch {
            description: Some(FieldPatch::Clear),
            due_date: Some(FieldPatch::Clear),
            pomodoro_count: Some(FieldPatch::Set(4)),
            ..TaskPatch::status(Status::Done)
        };
        let body = patch_body(&patch).unwrap_or_else(|err| panic!("body: {err}"));
        assert_eq!(
            body,
            json!({"description": "", "status": "done", "due_date": null, "pomodoro_count": 4})
        );
    }

    #[test]
    fn recurrence_uses_snake_case_both_ways() {
        let task = Task::from(record(json!({
            "id": 4,
            "title": "Water plants",
            "created_at": "2024-01-10T09:00:00Z",
            "updated_at": "2024-01-10T09:00:00Z",
            "recurring": {"interval": "custom", "custom_days": 3, "last_created": "2024-01-10T09:00:00Z"}
        })));
        let recurrence = Recurrence {
            interval: RecurrenceInterval::Custom,
            custom_days: Some(3),
            last_created: datetime!(2024-01-10 09:00 UTC),
        };
        assert_eq!(task.recurring.as_ref(), Some(&recurrence));

        let camel = Task::from(record(json!({
            "id": 5,
            "title": "Legacy",
            "created_at": "2024-01-10T09:00:00Z",
            "updated_at": "2024-01-10T09:00:00Z",
            "recurring": {"interval": "weekly", "lastCreated": "2024-01-10T09:00:00Z"}
        })));
        assert_eq!(camel.recurring.map(|rule| rule.interval), Some(RecurrenceInterval::Weekly));

        let expected = json!({"interval": "custom", "custom_days": 3, "last_created": "2024-01-10T09:00:00Z"});
        let created = serde_json::to_value(NewTaskBody::from(&task))
            .unwrap_or_else(|err| panic!("body: {err}"));
        assert_eq!(created["recurring"], expected);

        let patch = TaskPatch {
            recurring: Some(FieldPatch::Set(recurrence)),
            ..TaskPatch::default()
        };
        let body = patch_body(&patch).unwrap_or_else(|err| panic!("body: {err}"));
        assert_eq!(body, json!({"recurring": expected}));
    }

    #[test]
    fn new_task_body_uses_snake_case() {
        let task = tarea_core::TaskDraft {
            due_date: Some(datetime!(2024-01-12 12:00 UTC)),
            pomodoro_count: Some(1),
            ..tarea_core::TaskDraft::new("Write")
        }
        .into_task(TaskId::from("tmp"), datetime!(2024-01-10 09:00 UTC))
        .unwrap_or_else(|err| panic!("task: {err}"));
        let body = serde_json::to_value(NewTaskBody::from(&task))
            .unwrap_or_else(|err| panic!("body: {err}"));
        assert_eq!(body["due_date"], json!("2024-01-12T12:00:00Z"));
        assert_eq!(body["pomodoro_count"], json!(1));
        assert_eq!(body["description"], json!(""));
        assert!(body.get("id").is_none());
    }
}
