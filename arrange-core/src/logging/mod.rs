//! Structured logging for reorder operations
//!
//! The core only emits `tracing` events and spans. Hosts that want them on
//! a terminal or in a file call [`init_tracing`] once at startup; library
//! users with their own subscriber can skip it entirely.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingSettings;

static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

static TRACING_CONFIG: OnceLock<TracingConfig> = OnceLock::new();

/// Crate targets covered by the default filter
const DEFAULT_TARGETS: &[&str] = &["arrange_core", "arrange_cli"];

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to install the subscriber
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// The filter directive could not be parsed
    #[error("Invalid tracing filter '{filter}': {reason}")]
    InvalidFilter {
        /// Filter as given
        filter: String,
        /// Parser message
        reason: String,
    },

    /// Unknown level name
    #[error("Unknown log level: {0}")]
    InvalidLevel(String),

    /// Tracing already initialized
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,

    /// Failed to create log file
    #[error("Failed to create log file {path}: {reason}")]
    FileCreationFailed {
        /// Requested log file
        path: PathBuf,
        /// IO error message
        reason: String,
    },
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;

/// Minimum level for the default filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Errors and warnings (rejections, hierarchy anomalies)
    Warn,
    /// Applied reorders
    #[default]
    Info,
    /// Drag transitions and computed plans
    Debug,
    /// Everything
    Trace,
}

impl TracingLevel {
    /// One step more verbose, saturating at `Trace`
    #[must_use]
    pub const fn more_verbose(self) -> Self {
        match self {
            Self::Error => Self::Warn,
            Self::Warn => Self::Info,
            Self::Info => Self::Debug,
            Self::Debug | Self::Trace => Self::Trace,
        }
    }
}

impl std::str::FromStr for TracingLevel {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(TracingError::InvalidLevel(s.to_string())),
        }
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Standard output
    Stdout,
    /// Standard error
    #[default]
    Stderr,
    /// A file, truncated on startup
    File(PathBuf),
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TracingConfig {
    /// Level applied to the crate targets
    pub level: TracingLevel,
    /// Output destination
    pub output: TracingOutput,
    /// Include thread IDs (useful when persistence tasks interleave)
    pub thread_ids: bool,
    /// Custom `EnvFilter` directive (overrides level if set)
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Creates a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from the `[logging]` settings section
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level,
            output: settings
                .file
                .clone()
                .map_or(TracingOutput::Stderr, TracingOutput::File),
            thread_ids: false,
            filter: settings.filter.clone(),
        }
    }

    /// Sets the log level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the output destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables or disables thread IDs
    #[must_use]
    pub const fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Sets a custom filter string
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Builds the filter this configuration resolves to
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::InvalidFilter`] if a custom filter does not
    /// parse.
    pub fn env_filter(&self) -> TracingResult<EnvFilter> {
        let directive = self.filter.clone().unwrap_or_else(|| {
            DEFAULT_TARGETS
                .iter()
                .map(|target| format!("{target}={}", self.level))
                .collect::<Vec<_>>()
                .join(",")
        });
        EnvFilter::try_new(&directive).map_err(|e| TracingError::InvalidFilter {
            filter: directive,
            reason: e.to_string(),
        })
    }
}

/// Installs the global subscriber
///
/// Call once at startup. Subsequent calls return
/// [`TracingError::AlreadyInitialized`].
///
/// # Errors
///
/// Returns an error if:
/// - Tracing has already been initialized
/// - The filter does not parse
/// - File output is configured but the file cannot be created
/// - Another global subscriber is already installed
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    let result = install(config);
    if result.is_err() {
        TRACING_INITIALIZED.store(false, Ordering::SeqCst);
        return result;
    }

    let _ = TRACING_CONFIG.set(config.clone());
    tracing::info!(level = %config.level, "Tracing initialized");
    Ok(())
}

fn install(config: &TracingConfig) -> TracingResult<()> {
    let filter = config.env_filter()?;

    let (writer, ansi) = match &config.output {
        TracingOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), true),
        TracingOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        TracingOutput::File(path) => {
            let file =
                std::fs::File::create(path).map_err(|e| TracingError::FileCreationFailed {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            (BoxMakeWriter::new(std::sync::Mutex::new(file)), false)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(config.thread_ids)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))
}

/// Checks if tracing has been initialized
#[must_use]
pub fn is_tracing_initialized() -> bool {
    TRACING_INITIALIZED.load(Ordering::SeqCst)
}

/// Gets the active tracing configuration (if initialized)
#[must_use]
pub fn get_tracing_config() -> Option<&'static TracingConfig> {
    TRACING_CONFIG.get()
}

/// Standard span names for reorder operations
pub mod span_names {
    /// Flat list drop resolution and local apply
    pub const REORDER_FLAT: &str = "reorder.flat";
    /// Tree drop planning and local apply
    pub const REORDER_TREE: &str = "reorder.tree";
    /// Background flat persistence call
    pub const PERSIST_FLAT: &str = "persist.flat";
    /// Background tree persistence call
    pub const PERSIST_TREE: &str = "persist.tree";
    /// Refetch after a rejected write
    pub const REFETCH: &str = "refetch";
    /// Settings load
    pub const CONFIG_LOAD: &str = "config.load";
}
