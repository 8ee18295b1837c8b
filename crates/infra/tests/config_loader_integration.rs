//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! layering environment overrides on top.

use std::path::PathBuf;
use std::time::Duration;

use cdnguard_common::observability::LogLevel;
use cdnguard_infra::config::{self, Config, ENV_MAX_DELAY_MS, ENV_MAX_RETRIES};
use cdnguard_infra::{build_executor, InfraError};
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write config file");
    path
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "cdnguard.toml",
        r#"
[executor]
max_retries = 2
base_delay_ms = 100
max_delay_ms = 5000
console_level = "warn"

[logging]
log_path = "/var/log/cdnguard/operations.jsonl"
filter = "info,cdnguard=debug"
"#,
    );

    let config = config::load_from_file(Some(path)).expect("Failed to load TOML config");

    assert_eq!(config.executor.max_retries, 2);
    assert_eq!(config.executor.base_delay, Duration::from_millis(100));
    assert_eq!(config.executor.max_delay, Duration::from_secs(5));
    assert_eq!(config.executor.console_level, LogLevel::Warn);
    assert_eq!(
        config.logging.log_path,
        Some(PathBuf::from("/var/log/cdnguard/operations.jsonl"))
    );
    assert_eq!(config.logging.filter, "info,cdnguard=debug");
    assert!(!config.logging.json);
}

#[test]
fn test_load_config_from_json_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "config.json",
        r#"{
            "executor": { "max_retries": 5, "base_delay_ms": 250 },
            "logging": { "json": true }
        }"#,
    );

    let config = config::load_from_file(Some(path)).expect("Failed to load JSON config");

    assert_eq!(config.executor.max_retries, 5);
    assert_eq!(config.executor.base_delay, Duration::from_millis(250));
    assert_eq!(config.executor.max_delay, Duration::from_secs(30));
    assert!(config.logging.json);
    assert_eq!(config.logging.log_path, None);
}

#[test]
fn test_toml_and_json_agree() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let expected = Config::default();

    let toml_path = write_config(
        &dir,
        "cdnguard.toml",
        &toml::to_string(&expected).expect("Failed to serialize TOML"),
    );
    let json_path = write_config(
        &dir,
        "cdnguard.json",
        &serde_json::to_string_pretty(&expected).expect("Failed to serialize JSON"),
    );

    assert_eq!(config::load_from_file(Some(toml_path)).expect("TOML"), expected);
    assert_eq!(config::load_from_file(Some(json_path)).expect("JSON"), expected);
}

#[test]
fn test_empty_file_yields_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "cdnguard.toml", "");

    let config = config::load_from_file(Some(path)).expect("Empty TOML is valid");
    assert_eq!(config, Config::default());
}

#[test]
fn test_inverted_delay_bounds_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "cdnguard.toml",
        "[executor]\nbase_delay_ms = 10000\nmax_delay_ms = 1000\n",
    );

    let err = config::load_from_file(Some(path)).expect_err("max below base is invalid");
    assert!(matches!(err, InfraError::InvalidConfig(_)), "{err}");
}

#[test]
fn test_invalid_toml_reports_path() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "cdnguard.toml", "[executor\nmax_retries = ");

    let err = config::load_from_file(Some(path.clone())).expect_err("malformed TOML");
    match err {
        InfraError::ConfigParse { path: reported, format, .. } => {
            assert_eq!(reported, path);
            assert_eq!(format, "TOML");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_env_overrides_win_over_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "cdnguard.toml", "[executor]\nmax_retries = 1\n");
    let from_file = config::load_from_file(Some(path)).expect("Failed to load config");

    let config = config::apply_env_overrides(from_file, |key| match key {
        ENV_MAX_RETRIES => Some("7".to_string()),
        ENV_MAX_DELAY_MS => Some("60000".to_string()),
        _ => None,
    })
    .expect("valid overrides");

    assert_eq!(config.executor.max_retries, 7);
    assert_eq!(config.executor.max_delay, Duration::from_secs(60));
    assert_eq!(config.executor.base_delay, Duration::from_secs(1));
}

#[tokio::test]
async fn test_build_executor_with_file_sink() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.executor.max_retries = 0;
    config.logging.log_path = Some(dir.path().join("logs").join("operations.jsonl"));

    let executor = build_executor(&config).expect("Failed to build executor");
    assert_eq!(executor.config().max_attempts(), 1);
    assert!(dir.path().join("logs").join("operations.jsonl").exists());
}

#[test]
fn test_build_executor_without_log_path() {
    let executor = build_executor(&Config::default()).expect("Failed to build executor");
    assert_eq!(executor.config(), &Config::default().executor);
}
