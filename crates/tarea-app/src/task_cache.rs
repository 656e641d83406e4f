//! In-memory task collection with an id index and derived views.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use tarea_core::{Status, Task, TaskFilter, TaskId};
use time::OffsetDateTime;

/// Ordered task collection mirroring what the backend confirmed.
#[derive(Debug, Default, Clone)]
pub struct TaskCollection {
    /// Tasks in display order (newest first for locally created tasks).
    tasks: Vec<Task>,
    /// Mapping from task id to index into [`tasks`](Self::tasks).
    task_index: HashMap<TaskId, usize>,
}

impl TaskCollection {
    /// Build a collection, keeping the first occurrence of a duplicated id.
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut seen = BTreeSet::new();
        let tasks = tasks
            .into_iter()
            .filter(|task| seen.insert(task.id.clone()))
            .collect();
        let mut collection = Self {
            tasks,
            task_index: HashMap::new(),
        };
        collection.rebuild_indexes();
        collection
    }

    fn rebuild_indexes(&mut self) {
        self.task_index.clear();
        for (idx, task) in self.tasks.iter().enumerate() {
            self.task_index.insert(task.id.clone(), idx);
        }
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the collection holds no task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterate in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Whether a task with `id` is present.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.task_index.contains_key(id)
    }

    /// Borrow a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.task_index.get(id).and_then(|&idx| self.tasks.get(idx))
    }

    /// Insert at the front, dropping any previous entry with the same id.
    pub fn prepend(&mut self, task: Task) {
        self.tasks.retain(|existing| existing.id != task.id);
        self.tasks.insert(0, task);
        self.rebuild_indexes();
    }

    /// Replace the entry with the same id in place. Returns false when absent.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.task_index.get(&task.id) {
            Some(&idx) => {
                self.tasks[idx] = task;
                true
            }
            None => false,
        }
    }

    /// Mutable access to a single task.
    pub fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        let idx = *self.task_index.get(id)?;
        self.tasks.get_mut(idx)
    }

    /// Remove a task by id.
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let idx = self.task_index.get(id).copied()?;
        let removed = self.tasks.remove(idx);
        self.rebuild_indexes();
        Some(removed)
    }

    /// Drop every task.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.task_index.clear();
    }

    /// Clone out the full collection.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Tasks matching `filter`, in collection order.
    #[must_use]
    pub fn filtered(&self, filter: &TaskFilter, now: OffsetDateTime) -> Vec<Task> {
        filter.apply(&self.tasks, now).cloned().collect()
    }

    /// Sorted distinct tags across all tasks.
    #[must_use]
    pub fn all_tags(&self) -> Vec<String> {
        self.tasks
            .iter()
            .flat_map(|task| task.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Kanban view: one column per status, most recently updated first.
    #[must_use]
    pub fn board(&self, limit: usize) -> Board {
        let columns = Status::ALL
            .into_iter()
            .map(|status| {
                let mut tasks: Vec<&Task> = self.tasks.iter().filter(|task| task.status == status).collect();
                tasks.sort_by_key(|task| Reverse(task.updated_at));
                BoardColumn {
                    status,
                    total: tasks.len(),
                    tasks: tasks.into_iter().take(limit).cloned().collect(),
                }
            })
            .collect();
        Board { columns }
    }
}

/// Derived kanban board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Columns in workflow order.
    pub columns: Vec<BoardColumn>,
}

impl Board {
    /// Column for a status.
    #[must_use]
    pub fn column(&self, status: Status) -> Option<&BoardColumn> {
        self.columns.iter().find(|column| column.status == status)
    }
}

/// One kanban column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    /// Status shown by the column.
    pub status: Status,
    /// Number of tasks with that status, before capping.
    pub total: usize,
    /// Most recently updated tasks, capped at the board limit.
    pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use tarea_core::{Priority, TaskDraft};
    use time::Duration;
    use time::macros::datetime;

    const BASE: OffsetDateTime = datetime!(2024-01-10 09:00 UTC);

    fn task(id: &str, status: Status, minutes: i64, tags: &[&str]) -> Task {
        let mut task = TaskDraft {
            status,
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            ..TaskDraft::new(format!("task {id}"))
        }
        .into_task(TaskId::from(id), BASE)
        .unwrap_or_else(|err| panic!("must build task: {err}"));
        task.touch(BASE + Duration::minutes(minutes));
        task
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let collection = TaskCollection::from_tasks(vec![
            task("1", Status::Todo, 0, &[]),
            task("2", Status::Todo, 0, &[]),
            task("1", Status::Done, 0, &[]),
        ]);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(&TaskId::from("1")).map(|task| task.status), Some(Status::Todo));
    }

    #[test]
    fn prepend_and_remove_keep_index_consistent() {
        let mut collection = TaskCollection::from_tasks(vec![task("1", Status::Todo, 0, &[])]);
        collection.prepend(task("2", Status::Todo, 0, &[]));
        let ids: Vec<_> = collection.iter().map(|task| task.id.as_str().to_owned()).collect();
        assert_eq!(ids, ["2", "1"]);

        assert!(collection.remove(&TaskId::from("2")).is_some());
        assert!(collection.remove(&TaskId::from("2")).is_none());
        assert_eq!(collection.get(&TaskId::from("1")).map(|task| task.title.as_str()), Some("task 1"));
    }

    #[test]
    fn replace_requires_existing_entry() {
        let mut collection = TaskCollection::from_tasks(vec![task("1", Status::Todo, 0, &[])]);
        let mut changed = task("1", Status::Todo, 5, &[]);
        changed.priority = Priority::High;
        assert!(collection.replace(changed));
        assert!(!collection.replace(task("9", Status::Todo, 0, &[])));
        assert_eq!(collection.get(&TaskId::from("1")).unwrap().priority, Priority::High);
    }

    #[test]
    fn all_tags_are_sorted_and_distinct() {
        let collection = TaskCollection::from_tasks(vec![
            task("1", Status::Todo, 0, &["Web", "Design"]),
            task("2", Status::Todo, 0, &["Design", "Api"]),
        ]);
        assert_eq!(collection.all_tags(), ["Api", "Design", "Web"]);
    }

    #[test]
    fn board_orders_by_recent_update_and_caps_columns() {
        let collection = TaskCollection::from_tasks(vec![
            task("a", Status::Todo, 10, &[]),
            task("b", Status::Todo, 40, &[]),
            task("c", Status::Todo, 30, &[]),
            task("d", Status::Todo, 20, &[]),
            task("e", Status::Done, 0, &[]),
        ]);
        let board = collection.board(3);
        let todo = board.column(Status::Todo).expect("todo column");
        let ids: Vec<_> = todo.tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "d"]);
        assert_eq!(todo.total, 4);
        assert_eq!(board.column(Status::Progress).map(|column| column.total), Some(0));
        assert_eq!(board.column(Status::Done).map(|column| column.tasks.len()), Some(1));
    }
}
