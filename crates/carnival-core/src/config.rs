//! Configuration loading and typed config structures for the display engine.
//!
//! The canonical configuration lives in `carnival-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level display engine configuration.
///
/// Mirrors the structure of `carnival-config.yaml`. Every field has a
/// default, so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CarnivalConfig {
    /// Timer cadences and lock window.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Persistence backend connection.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Observer HTTP server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CarnivalConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `BACKEND_URL` overrides `backend.url`
    /// - `OBSERVER_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise use the defaults. Environment
    /// overrides apply either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BACKEND_URL") {
            self.backend.url = val;
        }
        if let Some(port) = std::env::var("OBSERVER_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.observer.port = port;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.display;
        if d.tick_interval_ms == 0 {
            return Err(invalid("display.tick_interval_ms", "must be positive"));
        }
        if d.rotation_interval_ms == 0 {
            return Err(invalid("display.rotation_interval_ms", "must be positive"));
        }
        if d.takeover_secs == 0 {
            return Err(invalid("display.takeover_secs", "must be positive"));
        }
        if d.lock_window_minutes <= 0 {
            return Err(invalid("display.lock_window_minutes", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}

/// Timer cadences for the display loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    /// Milliseconds between lifecycle ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Milliseconds between featured-event rotations.
    #[serde(default = "default_rotation_interval_ms")]
    pub rotation_interval_ms: u64,

    /// Seconds the "starting now" takeover stays on screen.
    #[serde(default = "default_takeover_secs")]
    pub takeover_secs: u64,

    /// Minutes before start at which an event may take the imminent-start
    /// lock.
    #[serde(default = "default_lock_window_minutes")]
    pub lock_window_minutes: i64,
}

impl DisplayConfig {
    /// Lifecycle tick period.
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Rotation tick period.
    pub const fn rotation_interval(&self) -> Duration {
        Duration::from_millis(self.rotation_interval_ms)
    }

    /// Takeover display time.
    pub const fn takeover_duration(&self) -> Duration {
        Duration::from_secs(self.takeover_secs)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            rotation_interval_ms: default_rotation_interval_ms(),
            takeover_secs: default_takeover_secs(),
            lock_window_minutes: default_lock_window_minutes(),
        }
    }
}

/// Persistence backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend REST API.
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Write store mutations back to the backend.
    #[serde(default = "default_true")]
    pub mirror_enabled: bool,
}

impl BackendConfig {
    /// Per-request timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            request_timeout_ms: default_request_timeout_ms(),
            mirror_enabled: default_true(),
        }
    }
}

/// Observer HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Interface to bind.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_rotation_interval_ms() -> u64 {
    15_000
}

const fn default_takeover_secs() -> u64 {
    30
}

const fn default_lock_window_minutes() -> i64 {
    5
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_owned()
}

const fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
