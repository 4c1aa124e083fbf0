//! Unit tests for config module
//!
//! Tests configuration defaults, TOML parsing and default-file creation.

#![allow(clippy::unwrap_used)]

use std::fs;

use tempfile::TempDir;

use crate::{
    RemoteMprisError,
    config::{Config, LogLevel, MPRIS_NAME_PREFIX},
};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.bus.name_prefix, MPRIS_NAME_PREFIX);
    assert_eq!(config.player.handoff_timeout_ms, 2000);
    assert!(!config.player.identity.is_empty());
}

#[test]
fn config_empty_toml_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn config_partial_sections_keep_other_defaults() {
    let toml_str = r#"
        [general]
        log_level = "debug"

        [player]
        identity = "Living Room"
    "#;

    let config = Config::from_toml_str(toml_str).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.player.identity, "Living Room");
    assert_eq!(config.player.handoff_timeout_ms, 2000);
    assert_eq!(config.bus.name_prefix, MPRIS_NAME_PREFIX);
}

#[test]
fn config_rejects_unknown_log_level() {
    let toml_str = r#"
        [general]
        log_level = "loud"
    "#;

    assert!(Config::from_toml_str(toml_str).is_err());
}

#[test]
fn config_serialize_contains_sections() {
    let toml_str = toml::to_string(&Config::default()).unwrap();

    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[bus]"));
    assert!(toml_str.contains("[player]"));
}

#[test]
fn load_from_creates_missing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/config.toml");

    let config = Config::load_from(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config, Config::default());
}

#[test]
fn load_from_reads_existing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(
        &path,
        r#"
[bus]
name_prefix = "org.mpris.MediaPlayer2.phone"

[player]
handoff_timeout_ms = 250
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.bus.name_prefix, "org.mpris.MediaPlayer2.phone");
    assert_eq!(
        config.player.handoff_timeout(),
        std::time::Duration::from_millis(250)
    );
}

#[test]
fn load_from_reports_invalid_toml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[player\nidentity = ").unwrap();

    let err = Config::load_from(&path).unwrap_err();

    assert!(err.to_string().contains("failed to parse TOML"));
}

#[test]
fn json_schema_lists_sections() {
    let schema = Config::json_schema().unwrap();

    assert!(schema.contains("general"));
    assert!(schema.contains("handoff_timeout_ms"));
}

#[test]
fn default_config_is_valid() {
    Config::default().validate().unwrap();
}

#[test]
fn zero_handoff_timeout_is_rejected() {
    let config = Config::from_toml_str("[player]\nhandoff_timeout_ms = 0\n").unwrap();

    let err = config.validate().unwrap_err();

    assert!(matches!(
        err,
        RemoteMprisError::ConfigValidation { ref component, .. }
            if component == "player.handoff_timeout_ms"
    ));
}

#[test]
fn invalid_name_prefix_is_rejected() {
    for prefix in ["", "nodots", "org..mpris", "org.mpris.1Player", "org mpris"] {
        let mut config = Config::default();
        config.bus.name_prefix = prefix.to_string();

        let err = config.validate().unwrap_err();
        assert!(
            matches!(
                err,
                RemoteMprisError::ConfigValidation { ref component, .. }
                    if component == "bus.name_prefix"
            ),
            "{prefix:?}"
        );
    }
}

#[test]
fn load_from_rejects_zero_handoff_timeout() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[player]\nhandoff_timeout_ms = 0\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();

    assert!(matches!(err, RemoteMprisError::ConfigValidation { .. }));
    assert!(err.to_string().contains("handoff_timeout_ms"));
}
