//! Core error types for brewguide-core.
//!
//! Recoverable failures are modelled here with thiserror. Caller contract
//! breaches (empty plan, saving an unfinished session) are not errors: the
//! engine panics on those and documents it under `# Panics`.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for brewguide-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Outcome handoff errors
    #[error("Outcome error: {0}")]
    Outcome(#[from] OutcomeError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Step order indices are not `0..len`
    #[error("Step at position {position} has order index {found}, expected {position}")]
    NonContiguousOrder { position: usize, found: usize },

    /// Rating outside 1..=5
    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Failures reported by an outcome store.
///
/// These are transient from the engine's point of view: the session stays
/// completed and the save can be retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutcomeError {
    /// The store could not persist the record
    #[error("Failed to save brew outcome: {reason}")]
    SaveFailed { reason: String },

    /// The store refused the record outright
    #[error("Outcome store rejected the record: {reason}")]
    Rejected { reason: String },
}

impl OutcomeError {
    /// Human-readable reason, suitable for an inline retry message.
    pub fn reason(&self) -> &str {
        match self {
            OutcomeError::SaveFailed { reason } | OutcomeError::Rejected { reason } => reason,
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
