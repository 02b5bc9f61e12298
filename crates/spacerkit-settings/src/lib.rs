//! SpacerKit Settings Crate
//!
//! Persisted configuration: generator constants, verifier windows and an
//! optional standards-matrix override.

pub mod config;
pub mod error;

pub use config::{
    config_dir, default_config_path, validate_standards, Config, FileFormat, APP_DIR, CONFIG_FILE,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
