// crates/model-tracking-config/src/config.rs
// ============================================================================
// Module: Model Tracking Configuration
// Description: Configuration loading and validation for model tracking.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: model-tracking-core, model-tracking-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and falls back to defaults; unknown keys and
//! out-of-range values fail closed.
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use model_tracking_core::FileLogSink;
use model_tracking_core::LogLevel;
use model_tracking_core::RequestContext;
use model_tracking_core::StderrLogSink;
use model_tracking_core::TrackingLogSink;
use model_tracking_store_sqlite::SqliteStoreConfig;
use model_tracking_store_sqlite::SqliteStoreMode;
use model_tracking_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "model-tracking.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MODEL_TRACKING_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for the request timeout.
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 60 * 60 * 1000;
/// Default `SQLite` database filename.
const DEFAULT_STORE_PATH: &str = "model-tracking.sqlite";

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Model tracking configuration.
///
/// # Invariants
/// - A loaded configuration has passed [`ModelTrackingConfig::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelTrackingConfig {
    /// `SQLite` store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Event log configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-request settings.
    #[serde(default)]
    pub requests: RequestsConfig,
}

impl ModelTrackingConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order is the explicit `path`, then `MODEL_TRACKING_CONFIG`,
    /// then `model-tracking.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.logging.validate()?;
        self.requests.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite` store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// `SQLite` database path.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Number of pooled read connections.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,
    /// Maximum size of each result payload in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Maximum size of each schema document in bytes.
    #[serde(default = "default_max_schema_bytes")]
    pub max_schema_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let defaults = default_sqlite();
        Self {
            path: defaults.path,
            busy_timeout_ms: defaults.busy_timeout_ms,
            journal_mode: defaults.journal_mode,
            sync_mode: defaults.sync_mode,
            read_pool_size: defaults.read_pool_size,
            max_payload_bytes: defaults.max_payload_bytes,
            max_schema_bytes: defaults.max_schema_bytes,
        }
    }
}

impl StoreConfig {
    /// Returns the equivalent `SQLite` store configuration.
    #[must_use]
    pub fn sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            read_pool_size: self.read_pool_size,
            max_payload_bytes: self.max_payload_bytes,
            max_schema_bytes: self.max_schema_bytes,
        }
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.sqlite_config()
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("store: {err}")))
    }
}

/// Returns the default database path.
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Returns store-crate defaults for the default path.
fn default_sqlite() -> SqliteStoreConfig {
    SqliteStoreConfig::new(default_store_path())
}

/// Returns the default busy timeout.
fn default_busy_timeout_ms() -> u64 {
    default_sqlite().busy_timeout_ms
}

/// Returns the default read pool size.
fn default_read_pool_size() -> usize {
    default_sqlite().read_pool_size
}

/// Returns the default payload limit.
fn default_max_payload_bytes() -> usize {
    default_sqlite().max_payload_bytes
}

/// Returns the default schema document limit.
fn default_max_schema_bytes() -> usize {
    default_sqlite().max_schema_bytes
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Event log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkType {
    /// Drop every event.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `logging.path`.
    File,
}

/// Event log configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Sink type.
    #[serde(default)]
    pub sink: LogSinkType,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Minimum level recorded.
    #[serde(default)]
    pub level: LogLevel,
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkType::File, None) => {
                Err(ConfigError::Invalid("file logging requires logging.path".to_string()))
            }
            (LogSinkType::File, Some(path)) => validate_path_string("logging.path", path),
            (LogSinkType::None | LogSinkType::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "logging.path is only valid with the file sink".to_string(),
            )),
            (LogSinkType::None | LogSinkType::Stderr, None) => Ok(()),
        }
    }

    /// Builds the configured sink; `None` means events are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the log file cannot be opened.
    pub fn build_sink(&self) -> Result<Option<Arc<dyn TrackingLogSink>>, ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkType::None, _) => Ok(None),
            (LogSinkType::Stderr, _) => Ok(Some(Arc::new(StderrLogSink::new(self.level)))),
            (LogSinkType::File, Some(path)) => {
                let sink = FileLogSink::new(path, self.level)
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Some(Arc::new(sink)))
            }
            (LogSinkType::File, None) => {
                Err(ConfigError::Invalid("file logging requires logging.path".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Per-request settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestsConfig {
    /// Deadline applied to every request, in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl RequestsConfig {
    /// Validates request settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.timeout_ms {
            Some(0) => Err(ConfigError::Invalid(
                "requests.timeout_ms must be greater than zero".to_string(),
            )),
            Some(value) if value > MAX_REQUEST_TIMEOUT_MS => Err(ConfigError::Invalid(format!(
                "requests.timeout_ms exceeds max ({MAX_REQUEST_TIMEOUT_MS})"
            ))),
            _ => Ok(()),
        }
    }

    /// Returns a fresh request context carrying the configured deadline.
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        let ctx = RequestContext::background();
        match self.timeout_ms {
            Some(ms) => ctx.with_timeout(Duration::from_millis(ms)),
            None => ctx,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path against length constraints.
fn validate_path_string(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
