//! CLI error types and exit codes.

use arrange_core::{ConfigError, ItemId, PersistError, TracingError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, arguments, IO
    pub const GENERAL_ERROR: i32 = 1;
    /// An item ID given on the command line does not exist
    pub const NOT_FOUND: i32 = 2;
    /// The items file could not be read or written
    pub const PERSISTENCE_FAILURE: i32 = 3;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Settings file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be set up
    #[error("Logging error: {0}")]
    Logging(#[from] TracingError),

    /// Items file error
    #[error("Storage error: {0}")]
    Persist(#[from] PersistError),

    /// A move was applied locally but the items file did not accept it
    #[error("Move was not saved: {0}")]
    NotSaved(String),

    /// Item not found
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Invalid argument combination
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON output error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success, including drops that were rejected as no-ops
    /// - 1: General error (configuration, arguments, IO)
    /// - 2: Unknown item ID
    /// - 3: Items file could not be read or written
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ItemNotFound(_) => exit_codes::NOT_FOUND,
            Self::Persist(_) | Self::NotSaved(_) => exit_codes::PERSISTENCE_FAILURE,
            Self::Config(_)
            | Self::Logging(_)
            | Self::InvalidArgument(_)
            | Self::Json(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
