//! Configuration file support for Pinpoint.
//!
//! Settings are stored as versioned JSON. Every section and field is optional
//! in the file and falls back to the built-in defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_STARTING_NUMBER, DRAG_THRESHOLD, MAX_IMAGE_SIZE, MAX_POINT_NUMBER, MAX_SCALE,
    MIN_SCALE, ZOOM_STEP,
};
use crate::viewport::ScaleLimits;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default)]
    pub preferences: UserPreferences,

    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub interaction: InteractionConfig,

    #[serde(default)]
    pub images: ImageConfig,
}

fn default_app_name() -> String {
    "Pinpoint".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Starting number for new projects
    #[serde(default = "default_starting_number")]
    pub starting_point_number: u32,
}

fn default_starting_number() -> u32 {
    DEFAULT_STARTING_NUMBER
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            starting_point_number: default_starting_number(),
        }
    }
}

/// Zoom limits and step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Multiplier per wheel notch or zoom button press
    pub zoom_step: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_step: ZOOM_STEP,
        }
    }
}

/// Pointer handling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Device pixels a marker press must move before it becomes a drag
    pub drag_threshold: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DRAG_THRESHOLD,
        }
    }
}

/// Attached image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Longest side of images attached to points, in pixels
    pub max_image_size: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_image_size: MAX_IMAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            viewport: ViewportConfig::default(),
            interaction: InteractionConfig::default(),
            images: ImageConfig::default(),
        }
    }

    /// Zoom range as used by the viewport.
    pub fn scale_limits(&self) -> ScaleLimits {
        ScaleLimits {
            min: self.viewport.min_scale,
            max: self.viewport.max_scale,
        }
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let viewport = &self.viewport;
        if !(viewport.min_scale.is_finite() && viewport.min_scale > 0.0) {
            return Err(ConfigError::invalid_value("viewport.min_scale", "must be positive"));
        }
        if !(viewport.max_scale.is_finite() && viewport.max_scale >= viewport.min_scale) {
            return Err(ConfigError::invalid_value(
                "viewport.max_scale",
                "must be at least min_scale",
            ));
        }
        if !(viewport.zoom_step.is_finite() && viewport.zoom_step > 1.0) {
            return Err(ConfigError::invalid_value("viewport.zoom_step", "must be greater than 1"));
        }
        let threshold = self.interaction.drag_threshold;
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(ConfigError::invalid_value(
                "interaction.drag_threshold",
                "must not be negative",
            ));
        }
        if self.images.max_image_size == 0 {
            return Err(ConfigError::invalid_value("images.max_image_size", "must not be zero"));
        }
        if !(1..=MAX_POINT_NUMBER).contains(&self.preferences.starting_point_number) {
            return Err(ConfigError::invalid_value(
                "preferences.starting_point_number",
                format!("must be between 1 and {}", MAX_POINT_NUMBER),
            ));
        }
        Ok(())
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Get the default filename of the config file.
    pub fn default_filename() -> &'static str {
        "pinpoint-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("pinpoint").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("pinpoint")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        Self::load_from_path(&path)
    }

    /// Try to load configuration from `path`, logging why if it can't.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }

    /// Save configuration to `path`, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A setting holds a value the application cannot use
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
