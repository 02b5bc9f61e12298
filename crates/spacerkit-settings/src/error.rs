//! Settings errors

use std::io;
use thiserror::Error;

/// Failure reading, writing or checking a settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("settings file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// JSON could not be parsed or rendered
    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML could not be parsed
    #[error("invalid TOML settings: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML could not be rendered
    #[error("cannot render TOML settings: {0}")]
    TomlRender(#[from] toml::ser::Error),

    /// Parsed values were rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Rejected settings values
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Extension is neither `.toml` nor `.json`
    #[error("unsupported settings format '{0}', expected .toml or .json")]
    UnsupportedFormat(String),

    /// A constant or window is outside its valid range
    #[error("{key} out of range: {value}")]
    ValueOutOfRange { key: String, value: String },

    /// Standards matrix cannot be checked against
    #[error("invalid standards matrix: {0}")]
    InvalidStandards(String),

    /// No config directory on this platform
    #[error("no config directory on {0}")]
    NoConfigDir(String),
}

impl ConfigError {
    pub fn out_of_range(key: impl Into<String>, value: impl ToString) -> Self {
        Self::ValueOutOfRange {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
