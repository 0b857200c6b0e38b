use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use dbtutor::config::{Config, ConfigError};
use dbtutor::executor::DEFAULT_MAX_RESULT_ROWS;
use dbtutor::samples::DatabaseId;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = Config::load_or_default(None).unwrap();
    assert_eq!(config.max_result_rows, DEFAULT_MAX_RESULT_ROWS);
    assert_eq!(config.default_database, DatabaseId::Salesman);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = write_config(r#"{ "default_database": "nobel" }"#);
    let config = Config::load(file.path()).unwrap();

    assert_eq!(
        config,
        Config {
            max_result_rows: DEFAULT_MAX_RESULT_ROWS,
            default_database: DatabaseId::Nobel,
        }
    );
}

#[test]
fn test_full_file() {
    let file = write_config(r#"{ "max_result_rows": 50, "default_database": "university" }"#);
    let config = Config::load_or_default(Some(file.path())).unwrap();

    assert_eq!(config.max_result_rows, 50);
    assert_eq!(config.default_database, DatabaseId::University);
}

#[test]
fn test_missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dbtutor.json");

    assert_eq!(Config::load_or_default(Some(path.as_path())).unwrap(), Config::default());
    assert!(matches!(Config::load(&path), Err(ConfigError::Io { .. })));
}

#[test]
fn test_invalid_file() {
    let file = write_config(r#"{ "default_database": "northwind" }"#);

    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("invalid config"));
}
