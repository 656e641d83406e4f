//! REST backend for tarea.
//!
//! Talks to a task service exposing `{base}/{tasks}` as a collection with
//! `{id}/` members and a nested `{id}/comments/` collection.

mod config;
mod error;
pub mod wire;

pub use config::{DEFAULT_AUTH_SCHEME, DEFAULT_TASKS_PATH, DEFAULT_TIMEOUT, HttpStoreConfig};
pub use error::{HttpStoreError, Result};

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tarea_core::{Comment, Task, TaskId, TaskPatch};
use tracing::debug;
use url::Url;

use crate::wire::{CommentRecord, NewCommentBody, NewTaskBody, TaskList, TaskRecord};

/// Client for the task service.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    config: HttpStoreConfig,
}

impl HttpStore {
    /// Build a client from settings.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: HttpStoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(HttpStoreError::Transport)?;
        Ok(Self { client, config })
    }

    /// Active settings.
    #[must_use]
    pub const fn config(&self) -> &HttpStoreConfig {
        &self.config
    }

    /// `GET {tasks}`.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status or undecodable body.
    pub async fn fetch_all(&self) -> Result<Vec<Task>> {
        let url = self.config.tasks_url()?;
        let list: TaskList = send_json(self.request(Method::GET, url)).await?;
        let tasks = list.into_tasks();
        debug!(count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    /// `POST {tasks}`; the service assigns the id and timestamps.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status or undecodable body.
    pub async fn create(&self, task: &Task) -> Result<Task> {
        let url = self.config.tasks_url()?;
        let request = self.request(Method::POST, url).json(&NewTaskBody::from(task));
        let record: TaskRecord = send_json(request).await?;
        let created = Task::from(record);
        debug!(task = %created.id, "Created task");
        Ok(created)
    }

    /// `PATCH {tasks}{id}/` with only the touched fields.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::NotFound`] for an unknown id, or another error on
    /// transport failure, non-success status or undecodable body.
    pub async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        let url = self.config.task_url(id.as_str())?;
        let body = wire::patch_body(patch).map_err(HttpStoreError::Encode)?;
        let record: TaskRecord = send_json(self.request(Method::PATCH, url).json(&body)).await?;
        debug!(task = %id, "Updated task");
        Ok(Task::from(record))
    }

    /// `DELETE {tasks}{id}/`.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::NotFound`] for an unknown id.
    pub async fn remove(&self, id: &TaskId) -> Result<()> {
        let url = self.config.task_url(id.as_str())?;
        send(self.request(Method::DELETE, url)).await?;
        debug!(task = %id, "Removed task");
        Ok(())
    }

    /// `POST {tasks}{id}/comments/`; the service assigns id, timestamp and author.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::NotFound`] for an unknown task.
    pub async fn append_comment(&self, id: &TaskId, content: &str) -> Result<Comment> {
        let url = self.config.comments_url(id.as_str())?;
        let request = self
            .request(Method::POST, url)
            .json(&NewCommentBody { content });
        let record: CommentRecord = send_json(request).await?;
        let comment = Comment::from(record);
        debug!(task = %id, comment = %comment.id, "Appended comment");
        Ok(comment)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match self.config.authorization() {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await.map_err(HttpStoreError::Transport)?;
    check_response(response).await
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = send(request).await?;
    response.json().await.map_err(HttpStoreError::Decode)
}

/// Map non-success statuses onto [`HttpStoreError`] variants.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), %url, "Service returned an error status");
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HttpStoreError::Unauthorized {
            status: status.as_u16(),
        },
        StatusCode::NOT_FOUND => HttpStoreError::NotFound { url },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => HttpStoreError::Rejected {
            status: status.as_u16(),
            body,
        },
        _ => HttpStoreError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        },
    })
}
