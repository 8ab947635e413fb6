//! Configuration loading tests

use std::path::{Path, PathBuf};

use muso_common::config::{resolve_library_root, TomlConfig};

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn parses_full_config() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_config(
        temp.path(),
        r#"
library_root = "/music/library"
staging_dir = "/music/staging"
user_agent = "test-agent/1.0"

[genres.worship]
label = "Worship & Praise"

[genres."christian music"]
label = "Christian Music"
main = true
"#,
    );

    let config = TomlConfig::load_from(&path).unwrap();
    assert_eq!(config.library_root.as_deref(), Some(Path::new("/music/library")));
    assert_eq!(config.staging_dir.as_deref(), Some(Path::new("/music/staging")));
    assert_eq!(config.user_agent.as_deref(), Some("test-agent/1.0"));

    let worship = &config.genres["worship"];
    assert_eq!(worship.label, "Worship & Praise");
    assert!(!worship.main);
    assert!(config.genres["christian music"].main);
}

#[test]
fn empty_config_uses_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_config(temp.path(), "");

    let config = TomlConfig::load_from(&path).unwrap();
    assert!(config.library_root.is_none());
    assert!(config.genres.is_empty());
}

#[test]
fn malformed_config_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_config(temp.path(), "library_root = [nonsense");

    assert!(TomlConfig::load_from(&path).is_err());
}

#[test]
fn cli_argument_wins_over_config() {
    let config = TomlConfig {
        library_root: Some(PathBuf::from("/from/config")),
        ..Default::default()
    };

    let resolved = resolve_library_root(Some(Path::new("/from/cli")), &config);
    assert_eq!(resolved, PathBuf::from("/from/cli"));
}

#[test]
fn config_value_used_without_cli_argument() {
    let config = TomlConfig {
        library_root: Some(PathBuf::from("/from/config")),
        ..Default::default()
    };

    let resolved = resolve_library_root(None, &config);
    assert_eq!(resolved, PathBuf::from("/from/config"));
}

#[test]
fn user_agent_override() {
    let config = TomlConfig {
        user_agent: Some("custom/2.0".to_string()),
        ..Default::default()
    };
    assert_eq!(muso_common::config::user_agent(&config), "custom/2.0");

    let default_agent = muso_common::config::user_agent(&TomlConfig::default());
    assert!(default_agent.starts_with("muso/"));
}
