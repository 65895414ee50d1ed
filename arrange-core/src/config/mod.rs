//! Settings for `arrange`
//!
//! Settings live in a single TOML file. Every section and field has a
//! default, so a missing file or a partial file is valid.

mod settings;

pub use settings::{ArrangeSettings, FlatSettings, LoggingSettings, TreeSettings};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::logging::span_names;

/// File name used under the platform config directory
pub const SETTINGS_FILE_NAME: &str = "arrange.toml";

/// Returns `<config dir>/arrange/arrange.toml`, if the platform has a
/// config directory.
#[must_use]
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("arrange").join(SETTINGS_FILE_NAME))
}

impl ArrangeSettings {
    /// Loads settings from `path`, falling back to defaults if it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds
    /// invalid values.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let _span = tracing::debug_span!(span_names::CONFIG_LOAD, path = %path.display()).entered();

        if !path.exists() {
            debug!("Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_toml(&content)?;
        debug!("Settings loaded");
        Ok(settings)
    }

    /// Parses and validates settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML or invalid values.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Writes settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }

        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Checks band ordering and the key gap.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        self.drop_zones
            .validate()
            .map_err(|reason| ConfigError::Validation {
                field: "drop_zones".to_string(),
                reason,
            })?;

        let gap = self.flat.min_key_gap;
        if !gap.is_finite() || gap <= 0.0 {
            return Err(ConfigError::Validation {
                field: "flat.min_key_gap".to_string(),
                reason: format!("must be a positive number, got {gap}"),
            });
        }

        if let Some(filter) = &self.logging.filter
            && filter.trim().is_empty()
        {
            return Err(ConfigError::Validation {
                field: "logging.filter".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
