//! Core error types for focusquest-core.
//!
//! Every error here is recoverable by the caller: the operation that failed
//! leaves session, ledger, reward and theme state exactly as it found them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusquest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An operation was attempted before its precondition held.
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Task index out of range.
    #[error("Task index {index} out of bounds (length: {len})")]
    Index { index: usize, len: usize },

    /// Locked theme selected without enough points to buy it.
    #[error("Not enough points: {needed} needed, {available} available")]
    InsufficientPoints { needed: u32, available: u32 },

    /// Theme id is not part of the catalog.
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Advisory collaborator errors (normally swallowed by `advise_or_fallback`)
    #[error("Advisory error: {0}")]
    Advisory(#[from] AdvisoryError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Preconditions checked before a state transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// Focus sessions need at least one task on the ledger.
    #[error("add at least one task before starting a focus session")]
    NoTasks,
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

    /// Dot-path key does not name a configuration value
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Could not resolve the configuration directory
    #[error("Configuration directory unavailable: {0}")]
    DataDir(String),
}

/// Failures of the advisory-message collaborator.
#[derive(Error, Debug)]
pub enum AdvisoryError {
    /// No API key or endpoint available
    #[error("Advisory service not configured: {0}")]
    NotConfigured(String),

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the service
    #[error("Advisory service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Service answered without any text
    #[error("Advisory service returned no text")]
    EmptyResponse,

    /// Request did not finish in time
    #[error("Advisory request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Endpoint URL could not be built
    #[error("Invalid advisory endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
