#![allow(missing_docs)]

use std::sync::Arc;

use serde_json::json;
use tarea_app::{AdapterError, Backend, StoreState, TaskStore, TaskStoreError};
use tarea_core::{FixedClock, Status, TaskDraft, TaskId, TaskPatch};
use tarea_store_http::{HttpStore, HttpStoreConfig};
use time::macros::datetime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ok<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
    result.unwrap_or_else(|err| panic!("{context}: {err}"))
}

fn remote_store(server: &MockServer) -> TaskStore<Backend> {
    let config = ok(HttpStoreConfig::new(&format!("{}/api/", server.uri())), "config")
        .with_token(Some("secret".into()));
    let backend = Backend::Remote(ok(HttpStore::new(config), "client"));
    TaskStore::with_clock(backend, Arc::new(FixedClock(datetime!(2024-01-10 09:00 UTC))))
}

fn task_json(id: i64, title: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "status": status,
        "priority": "medium",
        "tags": ["Work"],
        "due_date": null,
        "created_at": "2024-01-09T09:00:00Z",
        "updated_at": "2024-01-09T09:00:00Z",
        "comments": []
    })
}

async fn mount_list(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .and(header("Authorization", "Token secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn load_and_update_through_remote_backend() {
    let server = MockServer::start().await;
    mount_list(&server, json!([task_json(1, "Ship", "todo"), task_json(2, "Test", "todo")])).await;
    let mut shipped = task_json(1, "Ship", "done");
    shipped["updated_at"] = json!("2024-01-10T09:00:05Z");
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shipped))
        .expect(1)
        .mount(&server)
        .await;

    let store = remote_store(&server);
    assert_eq!(ok(store.load().await, "load"), 2);

    let updated = ok(
        store.update(&TaskId::from(1), TaskPatch::status(Status::Done)).await,
        "update",
    );
    assert_eq!(updated.status, Status::Done);
    assert_eq!(updated.updated_at, datetime!(2024-01-10 09:00:05 UTC));
    let statuses: Vec<_> = store.tasks().into_iter().map(|task| task.status).collect();
    assert_eq!(statuses, [Status::Done, Status::Todo]);
}

#[tokio::test]
async fn unauthorized_load_is_recorded_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = remote_store(&server);
    let err = store.load().await.err();
    assert!(matches!(err, Some(TaskStoreError::Adapter(AdapterError::Auth(_)))), "{err:?}");
    assert_eq!(store.state(), StoreState::Ready);
    assert!(store.is_empty());
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn rejected_create_leaves_count_unchanged() {
    let server = MockServer::start().await;
    mount_list(&server, json!([task_json(1, "Ship", "todo")])).await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"due_date": ["Invalid date."]})))
        .expect(1)
        .mount(&server)
        .await;

    let store = remote_store(&server);
    ok(store.load().await, "load");
    let err = store.create(TaskDraft::new("Broken")).await.err();
    assert!(
        matches!(err, Some(TaskStoreError::Adapter(AdapterError::Validation(ref body))) if body.contains("Invalid date")),
        "{err:?}"
    );
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn remote_delete_of_unknown_task_reports_not_found() {
    let server = MockServer::start().await;
    mount_list(&server, json!([task_json(1, "Ship", "todo")])).await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/1/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = remote_store(&server);
    ok(store.load().await, "load");
    let err = store.delete(&TaskId::from(1)).await.err();
    assert!(matches!(err, Some(TaskStoreError::Adapter(AdapterError::NotFound(_)))), "{err:?}");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn remote_comment_is_mirrored_in_memory() {
    let server = MockServer::start().await;
    mount_list(&server, json!([task_json(7, "Review", "progress")])).await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/7/comments/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3,
            "content": "LGTM",
            "timestamp": "2024-01-10T09:30:00Z",
            "user": {"id": 1, "name": "Grace", "email": "grace@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = remote_store(&server);
    ok(store.load().await, "load");
    let comment = ok(store.add_comment(&TaskId::from(7), " LGTM ").await, "comment");
    assert_eq!(comment.id.as_str(), "3");

    let task = store
        .get(&TaskId::from(7))
        .unwrap_or_else(|| panic!("task present"));
    assert_eq!(task.comments, vec![comment]);
    assert_eq!(task.updated_at, datetime!(2024-01-10 09:30 UTC));
}
