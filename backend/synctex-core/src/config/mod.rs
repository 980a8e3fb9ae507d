pub mod viewer_flags;

pub use viewer_flags::ViewerFlags;

use crate::SECRET_ENV_VAR;
use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_NAME: &str = "synctex-bridge";
const CONFIG_VERSION: u32 = 1;
const BACKGROUND_COLOR_PATTERN: &str = r"^#[0-9a-fA-F]{6}$";

static BACKGROUND_COLOR_REGEX: OnceLock<Regex> = OnceLock::new();

fn background_color_regex() -> &'static Regex {
    BACKGROUND_COLOR_REGEX
        .get_or_init(|| Regex::new(BACKGROUND_COLOR_PATTERN).expect("valid regex pattern"))
}

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewerConfig {
    pub executable_path: Option<PathBuf>,
    #[serde(default = "default_reuse_instance")]
    pub reuse_instance: bool,
    #[serde(default = "default_background_color")]
    pub background_color: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            executable_path: None,
            reuse_instance: default_reuse_instance(),
            background_color: default_background_color(),
        }
    }
}

/// Inverse-search side of the configuration.
///
/// Holds the *name* of the environment variable carrying the secret, never
/// the secret itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InverseSearchConfig {
    pub callback_executable_path: Option<PathBuf>,
    /// `0` lets the OS pick a free loopback port.
    #[serde(default)]
    pub listen_port: u16,
    #[serde(default = "default_secret_env_var")]
    pub secret_env_var: String,
}

impl Default for InverseSearchConfig {
    fn default() -> Self {
        Self {
            callback_executable_path: None,
            listen_port: 0,
            secret_env_var: default_secret_env_var(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub viewer: ViewerConfig,

    #[serde(default)]
    pub inverse_search: InverseSearchConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            viewer: ViewerConfig::default(),
            inverse_search: InverseSearchConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_reuse_instance() -> bool {
    true
}
fn default_background_color() -> String {
    "#ffffff".to_string()
}
fn default_secret_env_var() -> String {
    SECRET_ENV_VAR.to_string()
}

// ============================================
// IMPLEMENTATION
// ============================================

impl BridgeConfig {
    /// Per-user configuration directory (`<config_dir>/synctex-bridge`).
    #[track_caller]
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME))
            .ok_or_else(|| ConfigError::DirectoryNotFound {
                location: ErrorLocation::from(Location::caller()),
                reason: "platform has no per-user configuration directory".to_string(),
            })
    }

    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(BridgeConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: BridgeConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, the write or the rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(validation_error(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        if !background_color_regex().is_match(&self.viewer.background_color) {
            return Err(validation_error(format!(
                "Invalid background color: {} (expected #rrggbb)",
                self.viewer.background_color
            )));
        }

        if let Some(ref path) = self.viewer.executable_path
            && path.as_os_str().is_empty()
        {
            return Err(validation_error(
                "viewer.executable_path cannot be empty string",
            ));
        }

        if let Some(ref path) = self.inverse_search.callback_executable_path
            && path.as_os_str().is_empty()
        {
            return Err(validation_error(
                "inverse_search.callback_executable_path cannot be empty string",
            ));
        }

        let var = &self.inverse_search.secret_env_var;
        if var.is_empty() || var.contains('=') || var.contains('\0') {
            return Err(validation_error(format!(
                "Invalid secret environment variable name: {var:?}"
            )));
        }

        Ok(())
    }
}

#[track_caller]
fn validation_error(reason: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason: reason.into(),
    }
}
