//! Configuration loading for prompt-vault.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/prompt-vault/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::VaultError;

const APP_NAME: &str = "prompt-vault";

/// Which vector index implementation backs the deployment.
///
/// Scores from the two backends live on different scales, so a deployment
/// must stick to one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VectorBackend {
    /// Exact in-process index with local snapshots
    #[default]
    Flat,
    /// External vector store reached over HTTP
    Managed,
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSettings {
    #[serde(default)]
    pub backend: VectorBackend,

    /// Snapshot file for vector storage (flat backend)
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Snapshot file for the id list. Defaults to `<index_path>.ids.json`.
    #[serde(default)]
    pub ids_path: Option<String>,

    /// Snapshot after this many unsaved adds
    #[serde(default = "default_autosave_batch")]
    pub autosave_batch: usize,

    /// Snapshot when this many seconds passed since the last one (0 = off)
    #[serde(default)]
    pub autosave_interval_secs: u64,

    /// Base URL of the managed vector store
    #[serde(default = "default_managed_url")]
    pub managed_url: String,

    /// Collection name in the managed vector store
    #[serde(default = "default_collection")]
    pub collection: String,

    /// HTTP timeout for managed store calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_index_path() -> String {
    data_dir()
        .join("vector-index")
        .join("vectors.bin")
        .to_string_lossy()
        .to_string()
}

fn default_autosave_batch() -> usize {
    10
}

fn default_managed_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_collection() -> String {
    "prompts".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for VectorSettings {
    fn default() -> Self {
        Self {
            backend: VectorBackend::default(),
            index_path: default_index_path(),
            ids_path: None,
            autosave_batch: default_autosave_batch(),
            autosave_interval_secs: 0,
            managed_url: default_managed_url(),
            collection: default_collection(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl VectorSettings {
    /// Resolved path of the id list snapshot.
    pub fn ids_path(&self) -> PathBuf {
        match &self.ids_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!("{}.ids.json", self.index_path)),
        }
    }

    pub fn validate(&self) -> Result<(), VaultError> {
        if self.autosave_batch == 0 {
            return Err(VaultError::invalid("vector.autosave_batch", "must be > 0"));
        }
        if self.backend == VectorBackend::Managed && self.managed_url.is_empty() {
            return Err(VaultError::invalid(
                "vector.managed_url",
                "required for the managed backend",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(VaultError::invalid(
                "vector.request_timeout_secs",
                "must be > 0",
            ));
        }
        Ok(())
    }
}

/// Input limits applied by the workflows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitSettings {
    /// Maximum prompt/query length in characters
    #[serde(default = "default_max_prompt_length")]
    pub max_prompt_length: usize,

    /// Upper bound for `k` in a search request
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_prompt_length() -> usize {
    2000
}

fn default_max_results() -> usize {
    100
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_prompt_length: default_max_prompt_length(),
            max_results: default_max_results(),
        }
    }
}

impl LimitSettings {
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.max_prompt_length == 0 {
            return Err(VaultError::invalid("limits.max_prompt_length", "must be > 0"));
        }
        if self.max_results == 0 {
            return Err(VaultError::invalid("limits.max_results", "must be > 0"));
        }
        Ok(())
    }
}

/// Admission control configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,

    /// Requests admitted per client within one window
    #[serde(default = "default_requests_per_window")]
    pub requests_per_window: usize,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_requests_per_window() -> usize {
    60
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            requests_per_window: default_requests_per_window(),
            window_secs: default_window_secs(),
        }
    }
}

impl RateLimitSettings {
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.enabled && self.window_secs == 0 {
            return Err(VaultError::invalid("rate_limit.window_secs", "must be > 0"));
        }
        Ok(())
    }
}

/// Response generator provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponderProvider {
    /// Deterministic offline responder
    #[default]
    Simulated,
    /// OpenAI-compatible chat completions endpoint
    OpenAi,
}

/// Response generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderSettings {
    #[serde(default)]
    pub provider: ResponderProvider,

    /// Model name (e.g., "gpt-4o-mini")
    #[serde(default = "default_responder_model")]
    pub model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base_url: Option<String>,
}

fn default_responder_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            provider: ResponderProvider::default(),
            model: default_responder_model(),
            api_key: None,
            api_base_url: None,
        }
    }
}

impl ResponderSettings {
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.provider == ResponderProvider::OpenAi && self.api_key.is_none() {
            return Err(VaultError::invalid(
                "responder.api_key",
                "required for the open_ai provider",
            ));
        }
        Ok(())
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the RocksDB record store directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Fingerprint dimension shared by the embedder and the index
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    #[serde(default)]
    pub vector: VectorSettings,

    #[serde(default)]
    pub limits: LimitSettings,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub responder: ResponderSettings,
}

fn data_dir() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

fn default_db_path() -> String {
    data_dir().join("db").to_string_lossy().to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_embedding_dim() -> usize {
    384
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            embedding_dim: default_embedding_dim(),
            vector: VectorSettings::default(),
            limits: LimitSettings::default(),
            rate_limit: RateLimitSettings::default(),
            responder: ResponderSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/prompt-vault/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (VAULT_*, nested keys joined with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, VaultError> {
        let config_dir = ProjectDirs::from("", "", APP_NAME)
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| VaultError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| VaultError::Config(e.to_string()))?
            .set_default("embedding_dim", default_embedding_dim() as i64)
            .map_err(|e| VaultError::Config(e.to_string()))?
            .set_default("vector.index_path", default_index_path())
            .map_err(|e| VaultError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // VAULT_DB_PATH, VAULT_VECTOR__BACKEND, VAULT_RATE_LIMIT__ENABLED, ...
        builder = builder.add_source(
            Environment::with_prefix("VAULT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| VaultError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| VaultError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.embedding_dim == 0 {
            return Err(VaultError::invalid("embedding_dim", "must be > 0"));
        }
        self.vector.validate()?;
        self.limits.validate()?;
        self.rate_limit.validate()?;
        self.responder.validate()?;
        Ok(())
    }
}
