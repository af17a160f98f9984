//! Unit tests for configuration and graceful degradation
//!
//! Tests that manipulate SONGSMITH_ROOT_FOLDER are marked with #[serial]
//! so they never race each other.

use serial_test::serial;
use songsmith_common::config::{
    CompiledDefaults, ConfigOrigin, RootFolderInitializer, RootFolderResolver, TomlConfig,
    DATABASE_FILE_NAME, DEFAULT_PORT, ROOT_FOLDER_ENV,
};
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert!(defaults.root_folder.to_string_lossy().contains("songsmith"));
    assert_eq!(defaults.log_level, "info");
    assert_eq!(defaults.bind_address, "127.0.0.1");
    assert_eq!(defaults.port, DEFAULT_PORT);
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolver = RootFolderResolver::new(None, &TomlConfig::default());
    let root = resolver.resolve();

    assert_eq!(root, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_cli_argument_beats_environment() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/songsmith-from-env");

    let resolver = RootFolderResolver::new(
        Some(PathBuf::from("/tmp/songsmith-from-cli")),
        &TomlConfig::default(),
    );
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/songsmith-from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_environment_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/songsmith-from-env");

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/songsmith-from-toml")),
        ..Default::default()
    };
    let resolver = RootFolderResolver::new(None, &toml);
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/songsmith-from-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_toml_used_when_no_cli_or_env() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/songsmith-from-toml")),
        ..Default::default()
    };
    let resolver = RootFolderResolver::new(None, &toml);
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/songsmith-from-toml"));
}

#[test]
fn test_toml_full_file_parses() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("songsmith.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/songsmith"
port = 6000
generation_api_key = "secret"
generation_model = "some-model"
thesaurus_endpoint = "http://localhost:9999"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/songsmith")));
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.generation_api_key.as_deref(), Some("secret"));
    assert_eq!(config.generation_model.as_deref(), Some("some-model"));
    assert_eq!(config.thesaurus_endpoint.as_deref(), Some("http://localhost:9999"));
    assert_eq!(config.logging.level, "debug");
    assert!(config.generation_endpoint.is_none());
}

#[test]
fn test_toml_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("songsmith.toml");
    std::fs::write(&path, "port = 7000\n").unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.port, Some(7000));
    assert_eq!(config.logging.level, "info");
    assert!(config.root_folder.is_none());
}

#[test]
fn test_missing_toml_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let (config, origin) = TomlConfig::load_or_default(Some(&path));
    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(origin, ConfigOrigin::Missing(path));
}

#[test]
fn test_broken_toml_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("songsmith.toml");
    std::fs::write(&path, "port = = nope").unwrap();

    assert!(TomlConfig::load(&path).is_err());

    let (config, origin) = TomlConfig::load_or_default(Some(&path));
    assert!(config.port.is_none());
    assert!(matches!(origin, ConfigOrigin::Invalid(_)));
}

#[test]
fn test_valid_toml_reports_file_origin() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("songsmith.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let (config, origin) = TomlConfig::load_or_default(Some(&path));
    assert_eq!(config.logging.level, "warn");
    assert_eq!(origin, ConfigOrigin::File(path));
}

#[test]
fn test_no_config_path_uses_defaults() {
    let (config, origin) = TomlConfig::load_or_default(None);
    assert!(config.generation_api_key.is_none());
    assert_eq!(origin, ConfigOrigin::Defaults);
}

#[test]
fn test_initializer_creates_nested_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("a").join("b").join("songsmith");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join(DATABASE_FILE_NAME));

    // Second call is a no-op
    initializer.ensure_directory_exists().unwrap();
}
