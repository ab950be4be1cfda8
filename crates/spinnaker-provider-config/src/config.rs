// crates/spinnaker-provider-config/src/config.rs
// ============================================================================
// Module: Spinnaker Provider Configuration
// Description: Configuration loading and validation for the provider.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: spinnaker-provider-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The `[gate]` section locates the Gate API and shapes its HTTP client; the
//! `[tasks]` section bounds how long remote tasks are awaited. Missing or
//! invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use spinnaker_provider_core::DEFAULT_MAX_ATTEMPTS;
use spinnaker_provider_core::TaskPolicy;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "spinnaker-provider.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SPINNAKER_PROVIDER_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of default headers.
pub(crate) const MAX_DEFAULT_HEADERS: usize = 64;
/// Maximum length of the user agent string.
pub(crate) const MAX_USER_AGENT_LENGTH: usize = 256;
/// Default Gate request timeout in milliseconds.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Minimum Gate request timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum Gate request timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 300_000;
/// Maximum number of task polls.
pub(crate) const MAX_TASK_ATTEMPTS: u32 = 100;
/// Default delay between task polls in milliseconds.
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
/// Minimum delay between task polls in milliseconds.
pub(crate) const MIN_POLL_INTERVAL_MS: u64 = 10;
/// Maximum delay between task polls in milliseconds.
pub(crate) const MAX_POLL_INTERVAL_MS: u64 = 60_000;
/// Maximum total task wait in milliseconds.
pub(crate) const MAX_DEADLINE_MS: u64 = 3_600_000;
/// Default user agent sent to Gate.
pub(crate) const DEFAULT_USER_AGENT: &str = concat!("spinnaker-provider/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Spinnaker provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Gate API connection settings.
    pub gate: GateConfig,
    /// Remote task polling settings.
    #[serde(default)]
    pub tasks: TaskConfig,
}

impl ProviderConfig {
    /// Loads configuration from disk using the default resolution rules.
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
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gate.validate()?;
        self.tasks.validate()
    }

    /// Returns the polling policy for the task tracker.
    #[must_use]
    pub fn task_policy(&self) -> TaskPolicy {
        self.tasks.policy()
    }
}

/// Gate API connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Base URL of the Gate API.
    pub endpoint: String,
    /// Comma-separated `key=value` headers sent with every request.
    #[serde(default)]
    pub default_headers: Option<String>,
    /// Skips TLS certificate verification.
    #[serde(default)]
    pub ignore_cert_errors: bool,
    /// Permits a plain `http` endpoint.
    #[serde(default)]
    pub allow_http: bool,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl GateConfig {
    /// Creates settings for `endpoint` with every other field defaulted.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            default_headers: None,
            ignore_cert_errors: false,
            allow_http: false,
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }

    /// Validates Gate connection settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint_url()?;
        match endpoint.scheme() {
            "https" => {}
            "http" if self.allow_http => {}
            "http" => {
                return Err(ConfigError::Invalid(
                    "gate.endpoint uses http; set gate.allow_http = true to permit it".to_string(),
                ));
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "gate.endpoint scheme must be http or https, found {other}"
                )));
            }
        }
        if endpoint.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::Invalid("gate.endpoint must include a host".to_string()));
        }
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "gate.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        let agent = self.user_agent.trim();
        if agent.is_empty() || agent.len() > MAX_USER_AGENT_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "gate.user_agent must be 1 to {MAX_USER_AGENT_LENGTH} characters"
            )));
        }
        self.headers()?;
        Ok(())
    }

    /// Parses the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the endpoint is not a URL.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        Url::parse(self.endpoint.trim())
            .map_err(|err| ConfigError::Invalid(format!("gate.endpoint is not a valid url: {err}")))
    }

    /// Returns the parsed default headers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for malformed header lists.
    pub fn headers(&self) -> Result<Vec<(String, String)>, ConfigError> {
        self.default_headers.as_deref().map_or_else(|| Ok(Vec::new()), parse_default_headers)
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Remote task polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TaskConfig {
    /// Maximum number of polls per task.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Optional bound on the total wait in milliseconds.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
            deadline_ms: None,
        }
    }
}

impl TaskConfig {
    /// Validates polling bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TASK_ATTEMPTS).contains(&self.max_attempts) {
            return Err(ConfigError::Invalid(format!(
                "tasks.max_attempts must be between 1 and {MAX_TASK_ATTEMPTS}"
            )));
        }
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            return Err(ConfigError::Invalid(format!(
                "tasks.poll_interval_ms must be between {MIN_POLL_INTERVAL_MS} and {MAX_POLL_INTERVAL_MS}"
            )));
        }
        if let Some(deadline) = self.deadline_ms
            && !(1..=MAX_DEADLINE_MS).contains(&deadline)
        {
            return Err(ConfigError::Invalid(format!(
                "tasks.deadline_ms must be between 1 and {MAX_DEADLINE_MS}"
            )));
        }
        Ok(())
    }

    /// Converts the settings into a tracker policy.
    #[must_use]
    pub const fn policy(&self) -> TaskPolicy {
        TaskPolicy {
            max_attempts: self.max_attempts,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            deadline: match self.deadline_ms {
                Some(deadline) => Some(Duration::from_millis(deadline)),
                None => None,
            },
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
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

/// Parses a comma-separated `key=value` header list.
///
/// Blank entries between commas are skipped. Keys and values are trimmed.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for entries without `=`, empty keys, or
/// too many headers.
pub fn parse_default_headers(list: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let mut headers = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(ConfigError::Invalid(format!(
                "gate.default_headers entry '{entry}' must be key=value"
            )));
        };
        let key = key.trim();
        if key.is_empty() || key.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
            return Err(ConfigError::Invalid(format!(
                "gate.default_headers entry '{entry}' has an invalid name"
            )));
        }
        headers.push((key.to_string(), value.trim().to_string()));
    }
    if headers.len() > MAX_DEFAULT_HEADERS {
        return Err(ConfigError::Invalid(format!(
            "gate.default_headers exceeds {MAX_DEFAULT_HEADERS} entries"
        )));
    }
    Ok(headers)
}

/// Resolves the config path from the caller or environment defaults.
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

/// Validates the resolved path against length limits.
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

/// Default Gate request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default user agent.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Default task poll budget.
const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Default delay between task polls.
const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

// ============================================================================
// SECTION: Tests
// ============================================================================
