//! Connection settings for the REST backend.

use std::time::Duration;

use url::Url;

use crate::error::{HttpStoreError, Result};

/// Default collection path relative to the base URL.
pub const DEFAULT_TASKS_PATH: &str = "tasks/";
/// Default `Authorization` scheme.
pub const DEFAULT_AUTH_SCHEME: &str = "Token";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where and how to reach the task service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStoreConfig {
    base_url: Url,
    tasks_path: String,
    auth_scheme: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpStoreConfig {
    /// Settings for the service rooted at `base_url`.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::InvalidUrl`] when the URL cannot be parsed or
    /// cannot carry a path.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| HttpStoreError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(HttpStoreError::InvalidUrl(format!("{base_url}: not a base URL")));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            tasks_path: DEFAULT_TASKS_PATH.to_owned(),
            auth_scheme: DEFAULT_AUTH_SCHEME.to_owned(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the collection path (leading slashes are ignored).
    #[must_use]
    pub fn with_tasks_path(mut self, path: &str) -> Self {
        let trimmed = path.trim_matches('/');
        self.tasks_path = if trimmed.is_empty() {
            DEFAULT_TASKS_PATH.to_owned()
        } else {
            format!("{trimmed}/")
        };
        self
    }

    /// Override the `Authorization` scheme, e.g. `Bearer`.
    #[must_use]
    pub fn with_auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    /// Attach a session token. Blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|value| !value.trim().is_empty());
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL, always ending with `/`.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Session token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Value of the `Authorization` header, when a token is present.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.token
            .as_deref()
            .map(|token| format!("{} {token}", self.auth_scheme))
    }

    /// URL of the task collection.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::InvalidUrl`] if the path cannot be joined.
    pub fn tasks_url(&self) -> Result<Url> {
        self.base_url
            .join(&self.tasks_path)
            .map_err(|err| HttpStoreError::InvalidUrl(format!("{}: {err}", self.tasks_path)))
    }

    /// URL of a single task, `{tasks}{id}/`.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::InvalidUrl`] if the path cannot be joined.
    pub fn task_url(&self, id: &str) -> Result<Url> {
        self.resource_url(&[id])
    }

    /// URL of a task's comment collection, `{tasks}{id}/comments/`.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::InvalidUrl`] if the path cannot be joined.
    pub fn comments_url(&self, id: &str) -> Result<Url> {
        self.resource_url(&[id, "comments"])
    }

    fn resource_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.tasks_url()?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| HttpStoreError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
            path.push("");
        }
        Ok(url)
    }
}
