//! Demo collection used to seed a fresh data directory.

use tarea_core::{
    Comment, CommentId, Priority, Recurrence, RecurrenceInterval, Status, Task, TaskId,
};
use time::{Duration, OffsetDateTime};

/// Three sample tasks anchored at `now`.
#[must_use]
pub fn sample_tasks(now: OffsetDateTime) -> Vec<Task> {
    vec![
        Task {
            id: TaskId::from("1"),
            title: "Design new landing page".into(),
            description: Some("Create wireframes and mockups for the new product landing page".into()),
            status: Status::Progress,
            priority: Priority::High,
            tags: vec!["Design".into(), "Web".into()],
            due_date: Some(now + Duration::days(2)),
            created_at: now,
            updated_at: now,
            comments: vec![Comment {
                id: CommentId::from("1"),
                content: "Started working on the wireframes".into(),
                timestamp: now,
                user: None,
            }],
            recurring: None,
            pomodoro_count: Some(3),
        },
        Task {
            id: TaskId::from("2"),
            title: "Review code submissions".into(),
            description: Some("Go through the recent pull requests and provide feedback".into()),
            status: Status::Todo,
            priority: Priority::Medium,
            tags: vec!["Code Review".into(), "Development".into()],
            due_date: Some(now + Duration::days(1)),
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
            recurring: Some(Recurrence {
                interval: RecurrenceInterval::Weekly,
                custom_days: None,
                last_created: now,
            }),
            pomodoro_count: None,
        },
        Task {
            id: TaskId::from("3"),
            title: "Update documentation".into(),
            description: Some("Update the API documentation with recent changes".into()),
            status: Status::Done,
            priority: Priority::Low,
            tags: vec!["Documentation".into()],
            due_date: None,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
            recurring: None,
            pomodoro_count: Some(2),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn samples_cover_every_status() {
        let now = datetime!(2024-01-10 09:00 UTC);
        let tasks = sample_tasks(now);
        for status in Status::ALL {
            assert!(tasks.iter().any(|task| task.status == status), "{status} missing");
        }
        assert!(tasks.iter().all(|task| task.updated_at >= task.created_at));
    }
}
