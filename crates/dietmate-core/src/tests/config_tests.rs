//! Tests for configuration loading and defaults
//!
//! Tests the config system including:
//! - Config defaults
//! - Partial files filling in defaults
//! - Loading a fully specified file
//! - Directories management

use std::time::Duration;

use crate::Error;
use crate::config::{Config, DaemonConfig, Directories};
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.app.root_url, "./");
    assert_eq!(config.app.main_page_marker, "index");
    assert_eq!(config.daemon.host_request_timeout_ms, 30_000);
}

#[test]
fn test_host_request_timeout_duration() {
    let daemon = DaemonConfig {
        host_request_timeout_ms: 1500,
    };
    assert_eq!(daemon.host_request_timeout(), Duration::from_millis(1500));
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load(&dir.path().join("nope.json")).unwrap();
    assert_eq!(config.app.main_page_marker, "index");
}

#[test]
fn test_partial_config_fills_defaults() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), r#"{"app": {"mainPageMarker": "home"}}"#).unwrap();

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.app.main_page_marker, "home");
    assert_eq!(config.app.root_url, "./");
    assert_eq!(config.daemon.host_request_timeout_ms, 30_000);
}

#[test]
fn test_unknown_fields_are_tolerated() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        r#"{"app": {"rootUrl": "/app/", "theme": "dark"}, "cache": {}}"#,
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.app.root_url, "/app/");
}

#[test]
fn test_invalid_json_is_an_error() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "{ not json").unwrap();

    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_load_full_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "app": {"rootUrl": "https://dietmate.app/", "mainPageMarker": "dashboard"},
            "daemon": {"hostRequestTimeoutMs": 5000}
        }"#,
    )
    .unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.app.root_url, "https://dietmate.app/");
    assert_eq!(loaded.app.main_page_marker, "dashboard");
    assert_eq!(loaded.daemon.host_request_timeout_ms, 5000);
}

#[test]
fn test_directories_with_base() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("dietmate");
    let dirs = Directories::with_base(base.clone());

    assert_eq!(dirs.config, base);
    assert_eq!(dirs.config_file, base.join("config.json"));
}
