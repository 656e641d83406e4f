#![allow(missing_docs)]

use std::fs;

use tarea_core::{Comment, FieldPatch, NoteDraft, NoteId, NotePatch, Status, TaskDraft, TaskId, TaskPatch};
use tarea_store_local::{LocalStore, LocalStoreError, TASKS_KEY};
use tempfile::TempDir;
use time::OffsetDateTime;
use time::macros::datetime;

const NOW: OffsetDateTime = datetime!(2024-01-10 09:00 UTC);

fn empty_store(dir: &TempDir) -> LocalStore {
    LocalStore::open(dir.path())
        .unwrap_or_else(|err| panic!("store must open: {err}"))
        .with_seed_demo(false)
}

fn temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|err| panic!("temp dir: {err}"))
}

fn draft_task(title: &str) -> tarea_core::Task {
    TaskDraft {
        tags: vec!["Work".into()],
        due_date: Some(datetime!(2024-01-12 12:00 UTC)),
        ..TaskDraft::new(title)
    }
    .into_task(TaskId::generate(), NOW)
    .unwrap_or_else(|err| panic!("draft must be valid: {err}"))
}

#[test]
fn missing_document_is_seeded_and_persisted() {
    let dir = temp_dir();
    let store = LocalStore::open(dir.path()).unwrap_or_else(|err| panic!("open: {err}"));

    let tasks = store.load_tasks(NOW).unwrap_or_else(|err| panic!("load: {err}"));
    assert_eq!(tasks.len(), 3);
    assert!(store.path_for(TASKS_KEY).exists());

    let again = store.load_tasks(NOW).unwrap_or_else(|err| panic!("reload: {err}"));
    assert_eq!(again, tasks);
}

#[test]
fn seeding_can_be_disabled() {
    let dir = temp_dir();
    let store = empty_store(&dir);
    let tasks = store.load_tasks(NOW).unwrap_or_else(|err| panic!("load: {err}"));
    assert!(tasks.is_empty());
    assert!(!store.path_for(TASKS_KEY).exists());
}

#[test]
fn tasks_round_trip_through_a_fresh_store() {
    let dir = temp_dir();
    let store = empty_store(&dir);
    let first = draft_task("First");
    let second = draft_task("Second");
    store.insert_task(&first).unwrap_or_else(|err| panic!("insert: {err}"));
    store.insert_task(&second).unwrap_or_else(|err| panic!("insert: {err}"));

    let reopened = empty_store(&dir);
    let tasks = reopened.load_tasks(NOW).unwrap_or_else(|err| panic!("load: {err}"));
    assert_eq!(tasks, vec![second, first]);
}

#[test]
fn document_uses_camel_case_fields() {
    let dir = temp_dir();
    let store = empty_store(&dir);
    store
        .insert_task(&draft_task("Shape"))
        .unwrap_or_else(|err| panic!("insert: {err}"));

    let raw = fs::read_to_string(store.path_for(TASKS_KEY)).unwrap_or_else(|err| panic!("read: {err}"));
    assert!(raw.contains("\"createdAt\":\"2024-01-10T09:00:00Z\""), "{raw}");
    assert!(raw.contains("\"dueDate\""), "{raw}");
    assert!(!raw.contains("created_at"), "{raw}");
}

#[test]
fn corrupt_document_is_quarantined() {
    let dir = temp_dir();
    let store = LocalStore::open(dir.path()).unwrap_or_else(|err| panic!("open: {err}"));
    fs::write(store.path_for(TASKS_KEY), "not json").unwrap_or_else(|err| panic!("write: {err}"));

    let err = store.load_tasks(NOW).err();
    assert!(matches!(err, Some(LocalStoreError::Decode { .. })), "{err:?}");
    assert!(dir.path().join("task-app-tasks.json.corrupt").exists());

    let task = draft_task("After corruption");
    store.insert_task(&task).unwrap_or_else(|err| panic!("insert: {err}"));
    let tasks = store.load_tasks(NOW).unwrap_or_else(|err| panic!("load: {err}"));
    assert_eq!(tasks, vec![task]);
}

#[test]
fn update_merges_and_stamps() {
    let dir = temp_dir();
    let store = empty_store(&dir);
    let task = draft_task("Draft");
    store.insert_task(&task).unwrap_or_else(|err| panic!("insert: {err}"));

    let later = datetime!(2024-01-11 10:00 UTC);
    let patch = TaskPatch {
        due_date: Some(FieldPatch::Clear),
        ..TaskPatch::status(Status::Done)
    };
    let updated = store
        .update_task(&task.id, &patch, later)
        .unwrap_or_else(|err| panic!("update: {err}"));
    assert_eq!(updated.status, Status::Done);
    assert_eq!(updated.due_date, None);
    assert_eq!(updated.updated_at, later);
    assert_eq!(updated.created_at, NOW);

    let stored = store.load_tasks(NOW).unwrap_or_else(|err| panic!("load: {err}"));
    assert_eq!(stored, vec![updated]);
}

#[test]
fn update_of_unknown_task_leaves_document_untouched() {
    let dir = temp_dir();
    let store = empty_store(&dir);
    let task = draft_task("Only");
    store.insert_task(&task).unwrap_or_else(|err| panic!("insert: {err}"));

    let err = store
        .update_task(&TaskId::from("missing"), &TaskPatch::status(Status::Done), NOW)
        .err();
    assert!(matches!(err, Some(LocalStoreError::TaskNotFound(ref id)) if id == "missing"));
    let stored = store.load_tasks(NOW).unwrap_or_else(|err| panic!("load: {err}"));
    assert_eq!(stored, vec![task]);
}

#[test]
fn rejected_patch_is_reported_as_invalid() {
    let dir = temp_dir();
    let store = empty_store(&dir);
    let task = draft_task("Keep me");
    store.insert_task(&task).unwrap_or_else(|err| panic!("insert: {err}"));

    let patch = TaskPatch {
        title: Some("   ".into()),
        ..TaskPatch::default()
    };
    let err = store.update_task(&task.id, &patch, NOW).err();
    assert!(matches!(err, Some(LocalStoreError::Invalid(_))));
}

#[test]
fn remove_is_idempotent() {
    let dir = temp_dir();
    let store = empty_store(&dir);
    let task = draft_task("Gone soon");
    store.insert_task(&task).unwrap_or_else(|err| panic!("insert: {err}"));

    assert!(store.remove_task(&task.id).unwrap_or_else(|err| panic!("remove: {err}")));
    assert!(!store.remove_task(&task.id).unwrap_or_else(|err| panic!("remove again: {err}")));
    let stored = store.load_tasks(NOW).unwrap_or_else(|err| panic!("load: {err}"));
    assert!(stored.is_empty());
}

#[test]
fn append_comment_stamps_the_task() {
    let dir = temp_dir();
    let store = empty_store(&dir);
    let task = draft_task("Discuss");
    store.insert_task(&task).unwrap_or_else(|err| panic!("insert: {err}"));

    let at = datetime!(2024-01-10 18:30 UTC);
    let comment = Comment::new("  Looks good  ", at).unwrap_or_else(|err| panic!("comment: {err}"));
    let updated = store
        .append_comment(&task.id, &comment)
        .unwrap_or_else(|err| panic!("append: {err}"));
    assert_eq!(updated.comments.len(), 1);
    assert_eq!(updated.comments[0].content, "Looks good");
    assert_eq!(updated.updated_at, at);

    let missing = store.append_comment(&TaskId::from("nope"), &comment).err();
    assert!(matches!(missing, Some(LocalStoreError::TaskNotFound(_))));
}

#[test]
fn clones_share_the_same_document() {
    let dir = temp_dir();
    let store = empty_store(&dir);
    let clone = store.clone();
    let handles: Vec<_> = (0..8)
        .map(|idx| {
            let store = clone.clone();
            std::thread::spawn(move || {
                store
                    .insert_task(&draft_task(&format!("Parallel {idx}")))
                    .unwrap_or_else(|err| panic!("insert: {err}"));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap_or_else(|_| panic!("thread panicked"));
    }
    let stored = store.load_tasks(NOW).unwrap_or_else(|err| panic!("load: {err}"));
    assert_eq!(stored.len(), 8);
}

#[test]
fn notes_round_trip() {
    let dir = temp_dir();
    let store = empty_store(&dir);
    assert!(store.load_notes().unwrap_or_else(|err| panic!("load: {err}")).is_empty());

    let note = NoteDraft {
        title: "Standup".into(),
        content: "Blocked on review".into(),
    }
    .into_note(NoteId::generate(), NOW)
    .unwrap_or_else(|err| panic!("note: {err}"));
    store.insert_note(&note).unwrap_or_else(|err| panic!("insert: {err}"));

    let later = datetime!(2024-01-10 12:00 UTC);
    let patch = NotePatch {
        content: Some("Unblocked".into()),
        ..NotePatch::default()
    };
    let updated = store
        .update_note(&note.id, &patch, later)
        .unwrap_or_else(|err| panic!("update: {err}"));
    assert_eq!(updated.updated_at, later);
    assert_eq!(store.load_notes().unwrap_or_else(|err| panic!("load: {err}")), vec![updated]);

    assert!(store.remove_note(&note.id).unwrap_or_else(|err| panic!("remove: {err}")));
    assert!(store.load_notes().unwrap_or_else(|err| panic!("load: {err}")).is_empty());
}
