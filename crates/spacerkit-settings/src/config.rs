//! Configuration management for SpacerKit
//!
//! Loads the shop constants and verifier windows from TOML or JSON, plus an
//! optional standards-matrix file that replaces the built-in lathe standards.

use serde::{Deserialize, Serialize};
use spacerkit_core::{GeneratorTuning, StandardsMatrix, VerifierTuning};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult, SettingsResult};

/// Application directory name under the platform config dir
pub const APP_DIR: &str = "spacerkit";
/// Config file name inside [`APP_DIR`]
pub const CONFIG_FILE: &str = "config.toml";

/// Supported file formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl FileFormat {
    /// Format for a path
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

fn read_file<T: for<'de> Deserialize<'de>>(path: &Path) -> SettingsResult<T> {
    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let value = match format {
        FileFormat::Toml => toml::from_str(&content)?,
        FileFormat::Json => serde_json::from_str(&content)?,
    };
    Ok(value)
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Standards matrix file replacing the built-in lathe standards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standards_path: Option<PathBuf>,
    /// Generator constants
    pub generator: GeneratorTuning,
    /// Verifier windows and limits
    pub verifier: VerifierTuning,
}

impl Config {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let config: Self = read_file(path)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load config from file, or the defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        let content = self.to_string_pretty(FileFormat::from_path(path)?)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Render the config in a file format
    pub fn to_string_pretty(&self, format: FileFormat) -> SettingsResult<String> {
        self.validate()?;
        let content = match format {
            FileFormat::Toml => toml::to_string_pretty(self)?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
        };
        Ok(content)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(field) = self.generator.non_positive_fields().first() {
            return Err(ConfigError::out_of_range(
                format!("generator.{}", field),
                "must be > 0",
            ));
        }
        if self.generator.step_tolerance < 0.0 {
            return Err(ConfigError::out_of_range(
                "generator.step_tolerance",
                self.generator.step_tolerance,
            ));
        }

        if self.generator.drill_breakthrough < 0.0 {
            return Err(ConfigError::out_of_range(
                "generator.drill_breakthrough",
                self.generator.drill_breakthrough,
            ));
        }

        let verifier = &self.verifier;
        if verifier.lookahead_lines == 0 {
            return Err(ConfigError::out_of_range("verifier.lookahead_lines", 0));
        }
        if verifier.context_lines == 0 {
            return Err(ConfigError::out_of_range("verifier.context_lines", 0));
        }
        let positive = [
            ("verifier.default_safe_feed", verifier.default_safe_feed),
            ("verifier.safe_entry_diameter", verifier.safe_entry_diameter),
            ("verifier.max_bore_step", verifier.max_bore_step),
            ("verifier.work_offset_clearance_z", verifier.work_offset_clearance_z),
        ];
        for (key, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::out_of_range(key, value));
            }
        }
        if verifier.dimension_tolerance_mm < 0.0 {
            return Err(ConfigError::out_of_range(
                "verifier.dimension_tolerance_mm",
                verifier.dimension_tolerance_mm,
            ));
        }
        if verifier.work_offset_clearance_z < verifier.work_offset_min_clearance {
            return Err(ConfigError::out_of_range(
                "verifier.work_offset_clearance_z",
                format!(
                    "{} is below work_offset_min_clearance {}",
                    verifier.work_offset_clearance_z, verifier.work_offset_min_clearance
                ),
            ));
        }

        if (verifier.safe_entry_diameter - self.generator.safe_entry_diameter).abs() > 1e-9
            || (verifier.max_bore_step - self.generator.max_bore_step).abs() > 1e-9
        {
            warn!("Verifier bore-step limits differ from the generator; generated programs may be flagged");
        }
        Ok(())
    }

    /// Standards matrix: the configured file, or the built-in standards
    pub fn load_standards(&self) -> SettingsResult<StandardsMatrix> {
        let Some(path) = &self.standards_path else {
            return Ok(StandardsMatrix::standard().clone());
        };
        let matrix: StandardsMatrix = read_file(path)?;
        validate_standards(&matrix)?;
        debug!(path = %path.display(), lathes = matrix.lathes.len(), "loaded standards");
        Ok(matrix)
    }
}

/// Reject standards records that cannot be checked against
pub fn validate_standards(matrix: &StandardsMatrix) -> ConfigResult<()> {
    if matrix.lathes.is_empty() {
        return Err(ConfigError::InvalidStandards("no lathe records".to_string()));
    }
    for record in &matrix.lathes {
        if record.round_sizes.is_empty() {
            return Err(ConfigError::InvalidStandards(format!(
                "{} has no round sizes",
                record.lathe
            )));
        }
        if record.chuck_capacity <= 0.0 || record.max_drill_depth <= 0.0 {
            return Err(ConfigError::InvalidStandards(format!(
                "{} chuck capacity and drill depth must be > 0",
                record.lathe
            )));
        }
        if record.min_thickness > record.max_thickness {
            return Err(ConfigError::InvalidStandards(format!(
                "{} thickness range {}-{} is inverted",
                record.lathe, record.min_thickness, record.max_thickness
            )));
        }
    }
    Ok(())
}

/// Platform config directory for SpacerKit
pub fn config_dir() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| ConfigError::NoConfigDir(std::env::consts::OS.to_string()))
}

/// Default config file path
pub fn default_config_path() -> ConfigResult<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}
