use spacerkit_core::{LatheId, StandardsMatrix};
use spacerkit_settings::{Config, ConfigError, SettingsError};
use tempfile::TempDir;

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::new();
    config.generator.chamfer_depth = 0.12;
    config.verifier.lookahead_lines = 80;
    config.save_to_file(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[generator]"));
    assert!(text.contains("chamfer_depth = 0.12"));

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip_into_nested_dir() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config::default();
    config.save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[verifier]\ncontext_lines = 10\n").unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.verifier.context_lines, 10);
    assert_eq!(config.verifier.lookahead_lines, 100);
    assert_eq!(config.generator, Config::default().generator);
}

#[test]
fn test_invalid_values_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[generator]\nsafe_entry_diameter = -1.0\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::ValueOutOfRange { .. })
    ));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    let err = Config::default().save_to_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_standards_override() {
    let dir = TempDir::new().unwrap();
    let standards_path = dir.path().join("standards.json");

    let mut matrix = StandardsMatrix::standard().clone();
    matrix.lathes.retain(|l| l.lathe != LatheId::L1);
    std::fs::write(&standards_path, serde_json::to_string(&matrix).unwrap()).unwrap();

    let config = Config {
        standards_path: Some(standards_path),
        ..Config::default()
    };
    let loaded = config.load_standards().unwrap();
    assert!(loaded.get(LatheId::L1).is_none());
    assert!(loaded.get(LatheId::L3).is_some());
}

#[test]
fn test_corrupted_standards_rejected() {
    let dir = TempDir::new().unwrap();
    let standards_path = dir.path().join("standards.json");
    std::fs::write(&standards_path, "{\"lathes\": []}").unwrap();

    let config = Config {
        standards_path: Some(standards_path),
        ..Config::default()
    };
    assert!(matches!(
        config.load_standards().unwrap_err(),
        SettingsError::Config(ConfigError::InvalidStandards(_))
    ));
}
