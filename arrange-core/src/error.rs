//! Error types for `arrange-core`
//!
//! Invalid drops are not errors (see [`crate::models::NoOpReason`]); the
//! types here cover the persistence collaborator and settings loading.

use thiserror::Error;

/// Errors reported by an [`OrderStore`](crate::persistence::OrderStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    /// The store refused the mutation
    #[error("Persistence rejected the update: {0}")]
    Rejected(String),

    /// The store could not be reached
    #[error("Persistence unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for persistence operations
pub type PersistResult<T> = Result<T, PersistError>;

/// Errors that can occur while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the settings file
    #[error("Failed to read settings from {path}: {source}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the settings file
    #[error("Failed to write settings to {path}: {source}")]
    Write {
        /// Path that was written
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A setting has an invalid value
    #[error("Invalid setting '{field}': {reason}")]
    Validation {
        /// Field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Result type for settings operations
pub type ConfigResult<T> = Result<T, ConfigError>;
