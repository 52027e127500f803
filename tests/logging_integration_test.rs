//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so only
//! one test here calls `init_logging` successfully.

use payorders_etl::config::LoggingConfig;
use payorders_etl::logging::{init_logging, parse_log_level};
use tempfile::TempDir;
use tracing::Level;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert!(config.validate().is_ok());
}

#[test]
fn test_logging_config_rejects_unknown_rotation() {
    let config = LoggingConfig {
        local_rotation: "weekly".to_string(),
        ..LoggingConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.contains("weekly"));
}

#[test]
fn test_invalid_level_fails_before_installing_subscriber() {
    let err = init_logging("chatty", &LoggingConfig::default())
        .err()
        .expect("invalid level must be rejected");
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("chatty"));
}

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
    assert!(parse_log_level("verbose").is_err());
}

#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "hourly".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(rows = 3, "logging integration test");
    drop(guard);

    assert!(log_path.is_dir());
}
