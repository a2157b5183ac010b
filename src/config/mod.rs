//! Configuration module
//!
//! Handles application settings: serial port, link tuning and logging

mod settings;

pub use settings::{AppConfig, ConfigError, LoggingConfig};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "navspark", "NavSpark").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default location of the configuration file
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
