//! PaintKit Settings Crate
//!
//! Handles application configuration: history limits, store defaults and
//! logging, loaded from and saved to JSON or TOML files.

pub mod config;
pub mod error;

pub use config::{default_config_path, Config, LoggingSettings, StoreSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
