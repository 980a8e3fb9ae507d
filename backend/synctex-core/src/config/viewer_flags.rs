use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;

use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const VIEWER_FLAGS_FILE_NAME: &str = "viewer.toml";

/// SumatraPDF's command-line spelling.
static SUMATRA_FLAGS: Lazy<ViewerFlags> = Lazy::new(|| ViewerFlags {
    background_color: "-bg-color".to_string(),
    reuse_instance: "-reuse-instance".to_string(),
    forward_search: "-forward-search".to_string(),
    page: "-page".to_string(),
    inverse_search: "-inverse-search".to_string(),
    file_placeholder: "%f".to_string(),
    line_placeholder: "%l".to_string(),
});

/// How the external viewer spells its flags and inverse-search placeholders.
///
/// Any field missing from `viewer.toml` keeps the SumatraPDF spelling, so a
/// viewer release that renames a single flag needs a one-line override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewerFlags {
    pub background_color: String,
    pub reuse_instance: String,
    pub forward_search: String,
    pub page: String,
    pub inverse_search: String,
    /// Substituted by the viewer with the clicked source file.
    pub file_placeholder: String,
    /// Substituted by the viewer with the clicked source line.
    pub line_placeholder: String,
}

impl Default for ViewerFlags {
    fn default() -> Self {
        SUMATRA_FLAGS.clone()
    }
}

impl ViewerFlags {
    pub fn sumatra() -> Self {
        SUMATRA_FLAGS.clone()
    }

    /// Load `viewer.toml` from the config directory.
    ///
    /// Always returns `Ok`: a missing or broken file falls back to the
    /// SumatraPDF spelling with a warning.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(VIEWER_FLAGS_FILE_NAME);

        if !path.exists() {
            info!("No {VIEWER_FLAGS_FILE_NAME} found, using SumatraPDF flags");
            return Ok(Self::default());
        }

        match Self::load_from_path(&path) {
            Ok(flags) => {
                info!("Viewer flags loaded from {}", path.display());
                Ok(flags)
            }
            Err(e) => {
                warn!("Failed to load viewer flags from {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            source: e,
        })?;

        let flags: ViewerFlags = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        flags.validate()?;

        Ok(flags)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let flags = [
            ("background_color", &self.background_color),
            ("reuse_instance", &self.reuse_instance),
            ("forward_search", &self.forward_search),
            ("page", &self.page),
            ("inverse_search", &self.inverse_search),
        ];

        for (name, flag) in flags {
            if flag.is_empty() || flag.chars().any(char::is_whitespace) {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!("Viewer flag '{name}' must be a single non-empty word"),
                });
            }
        }

        if self.file_placeholder.is_empty()
            || self.line_placeholder.is_empty()
            || self.file_placeholder == self.line_placeholder
        {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "File and line placeholders must be distinct and non-empty".to_string(),
            });
        }

        Ok(())
    }
}
