use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;

use regstore::load_config::{load_config, API_KEY_ENV, DEFAULT_SEARCH_SIZE, URL_ENV};

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

/// A full static config loads as written, with defaults where keys are omitted.
#[test]
#[serial]
fn test_load_config_from_file() {
    env::remove_var(URL_ENV);
    env::remove_var(API_KEY_ENV);
    let file = config_file(
        r#"
elasticsearch:
  url: "http://localhost:9200"
  index_prefix: eregs
"#,
    );

    let config = load_config(file.path()).expect("Config should load");
    assert_eq!(config.elasticsearch.url, "http://localhost:9200");
    assert_eq!(config.elasticsearch.index_prefix, "eregs");
    assert_eq!(config.elasticsearch.search_size, DEFAULT_SEARCH_SIZE);
    assert!(config.elasticsearch.api_key.is_none());
}

/// The environment overrides the URL and supplies the API key.
#[test]
#[serial]
fn test_load_config_injects_env() {
    let file = config_file(
        r#"
elasticsearch:
  url: "http://localhost:9200"
  search_size: 25
"#,
    );
    env::set_var(URL_ENV, "http://search.internal:9200");
    env::set_var(API_KEY_ENV, "top-secret-test-key");

    let config = load_config(file.path()).expect("Config should load");
    env::remove_var(URL_ENV);
    env::remove_var(API_KEY_ENV);

    assert_eq!(config.elasticsearch.url, "http://search.internal:9200");
    assert_eq!(config.elasticsearch.index_prefix, "regcore");
    assert_eq!(config.elasticsearch.search_size, 25);
    assert_eq!(
        config.elasticsearch.api_key.as_deref(),
        Some("top-secret-test-key")
    );
}

#[test]
#[serial]
fn test_load_config_errors_without_url() {
    env::remove_var(URL_ENV);
    let file = config_file("elasticsearch:\n  index_prefix: eregs\n");

    let err = load_config(file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains(URL_ENV), "Must mention the missing URL, got: {msg}");
}

#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    let file = config_file("not-yaml: [:::");

    let err = load_config(file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
#[serial]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
