//! Configuration and settings management for PaintKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform config directory.
//!
//! Configuration is organized into sections:
//! - History limits (undo depth, checkpoint interval)
//! - Store defaults (brush color, hit-test mode)
//! - Logging (level, output format)

use paintkit_store::{HistoryConfig, HitTestMode, StoreOptions, DEFAULT_BRUSH_COLOR};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Feature store defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Brush color for new paintings, `#rrggbb` or `#rgb`
    pub default_brush_color: String,
    /// How point queries decide what is under the cursor
    pub hit_test: HitTestMode,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            default_brush_color: DEFAULT_BRUSH_COLOR.to_string(),
            hit_test: HitTestMode::default(),
        }
    }
}

/// Logging preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Undo history limits
    #[serde(default)]
    pub history: HistoryConfig,
    /// Store defaults
    #[serde(default)]
    pub store: StoreSettings,
    /// Logging preferences
    #[serde(default)]
    pub logging: LoggingSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load config from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.history.max_depth == Some(0) {
            return Err(ConfigError::ValueOutOfRange {
                key: "history.max_depth".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        if self.history.checkpoint_interval == Some(0) {
            return Err(ConfigError::ValueOutOfRange {
                key: "history.checkpoint_interval".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        if !is_hex_color(&self.store.default_brush_color) {
            return Err(SettingsError::InvalidSetting {
                key: "store.default_brush_color".to_string(),
                reason: format!("'{}' is not a hex color", self.store.default_brush_color),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(SettingsError::InvalidSetting {
                key: "logging.level".to_string(),
                reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Feature store options described by this config
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            default_brush_color: self.store.default_brush_color.clone(),
            hit_test: self.store.hit_test,
        }
    }
}

/// Default location of the config file
///
/// `<config dir>/paintkit/config.toml`, falling back to the home directory
/// and then the working directory when no config dir is known.
pub fn default_config_path() -> PathBuf {
    let mut path = dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push("paintkit");
    path.push("config.toml");
    path
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 6 || hex.len() == 3) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
