use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use tarea_core::PomodoroSettings;
use tarea_store_http::{DEFAULT_AUTH_SCHEME, DEFAULT_TASKS_PATH, HttpStore, HttpStoreConfig};
use tarea_store_local::LocalStore;
use tracing::info;

use crate::adapter::Backend;
use crate::session;

const CONFIG_DIR: &str = ".tarea";
const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "tarea";

/// Column cap used by the board when nothing is configured.
pub const DEFAULT_COLUMN_LIMIT: usize = 3;
/// HTTP timeout used when nothing is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Top-level application configuration loaded from `.tarea/config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pomodoro: PomodoroConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

impl AppConfig {
    /// Load configuration for `workdir`, falling back to the user config directory.
    ///
    /// # Errors
    /// Returns an error when a present file cannot be read, parsed or validated.
    pub fn load(workdir: impl AsRef<Path>) -> Result<Self> {
        let project = project_config_path(workdir.as_ref());
        if project.exists() {
            return Self::from_path(&project);
        }
        match user_config_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a known working directory only.
    ///
    /// # Errors
    /// Returns an error when a present file cannot be read, parsed or validated.
    pub fn from_workdir(workdir: impl AsRef<Path>) -> Result<Self> {
        let config_path = project_config_path(workdir.as_ref());
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::from_path(&config_path)
    }

    /// Load and validate a specific file.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed or validated.
    pub fn from_path(config_path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.validate()?;
        info!(path = %config_path.display(), "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.pomodoro.validate()?;
        if self.board.column_limit == 0 {
            bail!("board.column_limit must be greater than zero");
        }
        Ok(())
    }

    /// Construct the task backend selected by `[storage]`.
    ///
    /// The remote token is taken from `TAREA_TOKEN` before the configured value.
    ///
    /// # Errors
    /// Returns an error when the data directory or HTTP client cannot be set up.
    pub fn build_backend(&self) -> Result<Backend> {
        let mut fetch = |key: &'static str| std::env::var(key).ok();
        self.build_backend_with(&mut fetch)
    }

    /// Same as [`build_backend`](Self::build_backend) with an injectable environment lookup.
    ///
    /// # Errors
    /// See [`build_backend`](Self::build_backend).
    pub fn build_backend_with(&self, fetch: &mut impl FnMut(&'static str) -> Option<String>) -> Result<Backend> {
        match self.storage.backend {
            BackendKind::Local => Ok(Backend::Local(self.open_local_store()?)),
            BackendKind::Remote => {
                let remote = self
                    .storage
                    .remote
                    .as_ref()
                    .ok_or_else(|| anyhow!("storage.remote is required for the remote backend"))?;
                let token = session::resolve_token_with(fetch, remote.token.as_deref());
                let store = HttpStore::new(remote.to_http_config(token)?)
                    .context("failed to build HTTP client")?;
                Ok(Backend::Remote(store))
            }
        }
    }

    /// Open the local data directory (notes always live there).
    ///
    /// # Errors
    /// Returns an error when the directory cannot be resolved or created.
    pub fn open_local_store(&self) -> Result<LocalStore> {
        let dir = self.storage.local.resolve_data_dir()?;
        let store = LocalStore::open(&dir)
            .with_context(|| format!("failed to open data directory {}", dir.display()))?;
        Ok(store.with_seed_demo(self.storage.local.seed_demo))
    }
}

fn project_config_path(workdir: &Path) -> PathBuf {
    workdir.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Path of the per-user configuration file, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Which backend persists tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON files in the data directory.
    #[default]
    Local,
    /// REST task service.
    Remote,
}

/// `[storage]` block.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if let Some(remote) = &self.remote {
            remote.validate()?;
        }
        if self.backend == BackendKind::Remote && self.remote.is_none() {
            bail!("storage.backend = \"remote\" requires a [storage.remote] section");
        }
        Ok(())
    }
}

/// `[storage.local]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub seed_demo: bool,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed_demo: true,
        }
    }
}

impl LocalConfig {
    /// Configured directory, or `<data_local_dir>/tarea`.
    ///
    /// # Errors
    /// Returns an error when the platform has no local data directory.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| anyhow!("no data directory available; set storage.local.data_dir"))
    }
}

/// `[storage.remote]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default = "default_tasks_path")]
    pub tasks_path: String,
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    fn validate(&self) -> Result<()> {
        HttpStoreConfig::new(&self.base_url)
            .with_context(|| format!("storage.remote.base_url '{}' is not a valid URL", self.base_url))?;
        if self.timeout_secs == 0 {
            bail!("storage.remote.timeout_secs must be greater than zero");
        }
        if self.auth_scheme.trim().is_empty() {
            bail!("storage.remote.auth_scheme must not be empty");
        }
        Ok(())
    }

    fn to_http_config(&self, token: Option<String>) -> Result<HttpStoreConfig> {
        let config = HttpStoreConfig::new(&self.base_url)
            .with_context(|| format!("invalid base URL {}", self.base_url))?
            .with_tasks_path(&self.tasks_path)
            .with_auth_scheme(self.auth_scheme.trim())
            .with_token(token)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        Ok(config)
    }
}

/// `[pomodoro]` block.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PomodoroConfig {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        let settings = PomodoroSettings::default();
        Self {
            focus_minutes: settings.focus_minutes,
            break_minutes: settings.break_minutes,
        }
    }
}

impl PomodoroConfig {
    /// Timer settings described by this block.
    #[must_use]
    pub const fn settings(&self) -> PomodoroSettings {
        PomodoroSettings {
            focus_minutes: self.focus_minutes,
            break_minutes: self.break_minutes,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.focus_minutes == 0 {
            bail!("pomodoro.focus_minutes must be greater than zero");
        }
        if self.break_minutes == 0 {
            bail!("pomodoro.break_minutes must be greater than zero");
        }
        Ok(())
    }
}

/// `[board]` block.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_column_limit")]
    pub column_limit: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            column_limit: DEFAULT_COLUMN_LIMIT,
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_tasks_path() -> String {
    DEFAULT_TASKS_PATH.to_owned()
}

fn default_auth_scheme() -> String {
    DEFAULT_AUTH_SCHEME.to_owned()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_focus_minutes() -> u32 {
    PomodoroSettings::default().focus_minutes
}

fn default_break_minutes() -> u32 {
    PomodoroSettings::default().break_minutes
}

const fn default_column_limit() -> usize {
    DEFAULT_COLUMN_LIMIT
}
