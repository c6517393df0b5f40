//! File-level tests for loading and saving configuration.

use podstudio_config::{BackendKind, ConfigError, StudioConfig};
use tempfile::TempDir;

#[test]
fn save_creates_parent_dirs_and_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = StudioConfig::default();
    config.audio.output_device = "USB Interface".to_string();
    config.audio.buffer_frames = 512;
    config.save(&path).unwrap();

    let loaded = StudioConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = StudioConfig::load_or_default_from(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, StudioConfig::default());
}

#[test]
fn load_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = StudioConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[audio]\nbackend = \"memory\"\n\n[logging]\nfilter = \"debug\"\n")
        .unwrap();

    let config = StudioConfig::load(&path).unwrap();
    assert_eq!(config.audio.backend, BackendKind::Memory);
    assert_eq!(config.audio.output_device, "default");
    assert_eq!(config.logging.filter, "debug");
    assert_eq!(config.input.extensions, vec!["wav".to_string()]);
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[audio\nbackend = ").unwrap();
    assert!(matches!(
        StudioConfig::load(&path),
        Err(ConfigError::TomlParse(_))
    ));
}
