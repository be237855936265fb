//! Core error types for quietforge-core.
//!
//! This module defines the error hierarchy using thiserror. Configuration
//! errors are raised while loading ritual content; the timing engine itself
//! has no runtime error path.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for quietforge-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration and ritual content errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Journal sink and suite bus errors
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

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
///
/// Every malformed ritual is rejected with one of these before a session
/// can be built from it.
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

    /// Ritual has no sections
    #[error("Ritual '{ritual}' has no sections")]
    EmptyRitual { ritual: String },

    /// Section with a zero duration
    #[error("Section {index} ('{label}') of ritual '{ritual}' must last at least one second")]
    NonPositiveDuration {
        ritual: String,
        index: usize,
        label: String,
    },

    /// Breath section whose cycle limit is zero
    #[error("Section {index} of ritual '{ritual}' has a cycle limit of zero")]
    ZeroCycleLimit { ritual: String, index: usize },

    /// Breathing pattern identifier that is not in the pattern library
    #[error("Unknown breathing pattern '{0}'")]
    UnknownPattern(String),

    /// Declared total duration disagrees with the section sum
    #[error("Ritual '{ritual}' declares {declared}s but its sections sum to {derived}s")]
    TotalMismatch {
        ritual: String,
        declared: u64,
        derived: u64,
    },

    /// Two rituals in one catalog share an id
    #[error("Duplicate ritual id '{0}'")]
    DuplicateRitual(String),

    /// Lookup of a ritual id that is not in the catalog
    #[error("Ritual '{0}' not found")]
    RitualNotFound(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Journal sink and suite bus errors.
#[derive(Error, Debug)]
pub enum JournalError {
    /// Local journal storage failed
    #[error("Journal storage error: {0}")]
    Storage(#[from] DatabaseError),

    /// Suite bus write failed
    #[error("Suite bus write to '{key}' failed: {message}")]
    BusWrite { key: String, message: String },

    /// Entry not found
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),
}

/// Audio cue playback errors.
#[derive(Error, Debug)]
pub enum CueError {
    /// The output device could not be written
    #[error("Cue output failed: {0}")]
    Output(#[from] std::io::Error),

    /// The cue could not be rendered
    #[error("Cue playback failed: {0}")]
    Playback(String),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for JournalError {
    fn from(err: rusqlite::Error) -> Self {
        JournalError::Storage(err.into())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(err.into())
    }
}

impl From<toml::ser::Error> for CoreError {
    fn from(err: toml::ser::Error) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
