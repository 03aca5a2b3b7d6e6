//! Core error types for fingerdraw-core.
//!
//! The selection state machine itself never fails: unknown ids, empty
//! assignments and double resets are no-ops. Errors only come out of the
//! ambient edges (configuration files, feedback collaborators).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fingerdraw-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No platform configuration directory
    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// Errors raised by audio/haptic collaborators.
///
/// These never reach the caller of the state machine; they are logged and
/// dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    /// The output device is missing or was released
    #[error("Feedback device unavailable: {0}")]
    Unavailable(String),

    /// Playback started but failed
    #[error("Feedback playback failed: {0}")]
    Playback(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
