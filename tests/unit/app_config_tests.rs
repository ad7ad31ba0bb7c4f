/*!
 * Tests for application configuration
 */

use anyhow::Result;
use glossfill::app_config::{Config, DatabaseBackend, LogLevel};

use crate::common;

#[test]
fn test_default_shouldTargetProductionMySql() {
    let config = Config::default();

    assert_eq!(config.database.backend, DatabaseBackend::MySql);
    assert_eq!(config.database.host, "localhost");
    assert_eq!(config.database.port, 3306);
    assert_eq!(config.database.charset, "utf8mb4");
    assert_eq!(config.import.default_category, "基础");
    assert_eq!(config.translation.target_language, "zh-CN");
    assert_eq!(config.translation.batch_size, 50);
    assert!(config.extract.segmentation);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
  "database": {"backend": "sqlite", "sqlite_path": "local.db"},
  "translation": {"batch_size": 5, "call_delay_ms": 0},
  "log_level": "debug"
}"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
    assert_eq!(config.database.sqlite_path.as_deref(), Some(std::path::Path::new("local.db")));
    assert_eq!(config.translation.batch_size, 5);
    assert_eq!(config.translation.call_delay_ms, 0);
    assert_eq!(config.translation.batch_delay_ms, 1000);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_loadOrCreate_withMalformedFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    let err = Config::load_or_create(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_loadOrCreate_twice_shouldReuseWrittenDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let first = Config::load_or_create(&path)?;
    let second = Config::load_or_create(&path)?;

    assert_eq!(first.database.database, second.database.database);
    assert_eq!(first.translation.endpoint, second.translation.endpoint);
    Ok(())
}

#[test]
fn test_validate_withInvalidValues_shouldReject() {
    let mut blank_host = Config::default();
    blank_host.database.host = "  ".to_string();
    assert!(blank_host.validate().is_err());

    let mut blank_category = Config::default();
    blank_category.import.default_category = String::new();
    assert!(blank_category.validate().is_err());

    let mut zero_interval = Config::default();
    zero_interval.translation.progress_interval = 0;
    assert!(zero_interval.validate().is_err());

    let mut blank_target = Config::default();
    blank_target.translation.target_language = " ".to_string();
    assert!(blank_target.validate().is_err());
}

#[test]
fn test_sqliteTestConfig_shouldValidate() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::sqlite_config(temp_dir.path());
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_logLevel_shouldMapToFilter() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
