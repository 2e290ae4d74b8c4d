// crates/judgment-gate-config/src/config.rs
// ============================================================================
// Module: Judgment Gate Configuration
// Description: Configuration loading and validation for the judgment gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: judgment-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicit path (argument or environment variable) must exist; a missing
//! file at the default location yields the built-in defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use judgment_gate_core::DEFAULT_CONTINUE_LABEL;
use judgment_gate_core::DEFAULT_STOP_LABEL;
use judgment_gate_core::DEFAULT_SUBMISSION_ERROR;
use judgment_gate_core::FileAuditSink;
use judgment_gate_core::GateAuditSink;
use judgment_gate_core::GateLabels;
use judgment_gate_core::NoopAuditSink;
use judgment_gate_core::StderrAuditSink;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "judgment-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "JUDGMENT_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a configured label in bytes.
pub const MAX_LABEL_LENGTH: usize = 256;
/// Maximum length of the API bearer token in bytes.
pub const MAX_BEARER_TOKEN_LENGTH: usize = 4096;
/// Default API connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;
/// Minimum API connect timeout in milliseconds.
pub const MIN_CONNECT_TIMEOUT_MS: u64 = 100;
/// Maximum API connect timeout in milliseconds.
pub const MAX_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Default API request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
/// Minimum API request timeout in milliseconds.
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 500;
/// Maximum API request timeout in milliseconds.
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 60_000;
/// Default maximum API response size in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// Upper bound on the configurable API response size in bytes.
pub const MAX_RESPONSE_BYTES_LIMIT: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Judgment gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JudgmentGateConfig {
    /// Default button and error labels.
    #[serde(default)]
    pub labels: LabelsConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Pipeline API client configuration.
    #[serde(default)]
    pub api: ApiConfig,
}

impl JudgmentGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved.path)?;
        if resolved.implicit && !resolved.path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&resolved.path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
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
        self.labels.validate()?;
        self.audit.validate()?;
        self.api.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Default labels applied when a stage does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelsConfig {
    /// Stop button label.
    #[serde(default = "default_stop_label")]
    pub stop: String,
    /// Continue button label.
    #[serde(rename = "continue", default = "default_continue_label")]
    pub continue_label: String,
    /// Inline message shown after a rejected submission.
    #[serde(default = "default_submission_error")]
    pub submission_error: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            stop: default_stop_label(),
            continue_label: default_continue_label(),
            submission_error: default_submission_error(),
        }
    }
}

impl LabelsConfig {
    /// Converts the configured labels into gate labels.
    #[must_use]
    pub fn to_gate_labels(&self) -> GateLabels {
        GateLabels {
            stop: self.stop.clone(),
            continue_label: self.continue_label.clone(),
            submission_error: self.submission_error.clone(),
        }
    }

    /// Validates label configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_label("labels.stop", &self.stop)?;
        validate_label("labels.continue", &self.continue_label)?;
        validate_label("labels.submission_error", &self.submission_error)
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit events are dropped.
    #[default]
    None,
}

/// Audit sink configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the audit file cannot be opened.
    pub fn build_sink(&self) -> Result<Arc<dyn GateAuditSink>, ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for file sink".to_string()))
            }
        }
    }

    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for file sink".to_string()))
            }
            (AuditSinkKind::Stderr | AuditSinkKind::None, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only allowed for file sink".to_string(),
            )),
            (AuditSinkKind::Stderr | AuditSinkKind::None, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: API Client
// ============================================================================

/// Pipeline API client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Allow `http://` base URLs (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
    /// Optional bearer token sent with every request.
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Maximum accepted response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            allow_http: false,
            bearer_token: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl ApiConfig {
    /// Returns the base URL, required by API-backed commands.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when no base URL is configured.
    pub fn require_base_url(&self) -> Result<&str, ConfigError> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| ConfigError::Invalid("api.base_url must be set".to_string()))
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validates API client configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base_url) = &self.base_url {
            let trimmed = base_url.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "api.base_url must include http:// or https://".to_string(),
                ));
            }
            if trimmed.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(
                    "api.base_url uses http:// without allow_http".to_string(),
                ));
            }
        }
        if let Some(token) = &self.bearer_token {
            if token.trim().is_empty() {
                return Err(ConfigError::Invalid("api.bearer_token must be non-empty".to_string()));
            }
            if token.len() > MAX_BEARER_TOKEN_LENGTH {
                return Err(ConfigError::Invalid("api.bearer_token exceeds max length".to_string()));
            }
        }
        if !(MIN_CONNECT_TIMEOUT_MS..=MAX_CONNECT_TIMEOUT_MS).contains(&self.connect_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "api.connect_timeout_ms must be between {MIN_CONNECT_TIMEOUT_MS} and \
                 {MAX_CONNECT_TIMEOUT_MS}"
            )));
        }
        if !(MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS).contains(&self.request_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "api.request_timeout_ms must be between {MIN_REQUEST_TIMEOUT_MS} and \
                 {MAX_REQUEST_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::Invalid("api.max_response_bytes must be > 0".to_string()));
        }
        if self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(
                "api.max_response_bytes exceeds max limit".to_string(),
            ));
        }
        Ok(())
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

/// Config path plus whether it fell back to the default name.
struct ResolvedPath {
    /// Path to read.
    path: PathBuf,
    /// True when neither an explicit path nor the env var was given.
    implicit: bool,
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            implicit: false,
        });
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            implicit: false,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        implicit: true,
    })
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

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a display label.
fn validate_label(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_LABEL_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Default stop button label.
fn default_stop_label() -> String {
    DEFAULT_STOP_LABEL.to_string()
}

/// Default continue button label.
fn default_continue_label() -> String {
    DEFAULT_CONTINUE_LABEL.to_string()
}

/// Default submission error message.
fn default_submission_error() -> String {
    DEFAULT_SUBMISSION_ERROR.to_string()
}

/// Default API connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Default API request timeout.
const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Default API response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}
