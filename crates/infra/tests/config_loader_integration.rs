//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use guestdir_domain::constants::{DEFAULT_BASE_URL, DEFAULT_SCOPE};
use guestdir_domain::DirectoryError;
use guestdir_infra::config;
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "tenant_id": "contoso.onmicrosoft.com",
        "client_id": "11111111-2222-3333-4444-555555555555",
        "client_secret": "json-secret",
        "base_url": "http://localhost:8080/v1.0",
        "authority_url": "http://localhost:8081",
        "scope": "api://directory/.default",
        "invite_redirect_url": "https://portal.example.com",
        "send_invitation_message": false,
        "timeout_seconds": 15,
        "token_skew_seconds": 30,
        "max_attempts": 3
    }"#;
    let path = write_config(json_content, "json");

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_ok(), "Failed to load config from JSON file");

    let config = result.unwrap();

    assert_eq!(config.tenant_id, "contoso.onmicrosoft.com");
    assert_eq!(config.client_id, "11111111-2222-3333-4444-555555555555");
    assert_eq!(config.client_secret.expose(), "json-secret");
    assert_eq!(config.base_url, "http://localhost:8080/v1.0");
    assert_eq!(config.authority_url, "http://localhost:8081");
    assert_eq!(config.scope, "api://directory/.default");
    assert_eq!(config.invite_redirect_url, "https://portal.example.com");
    assert!(!config.send_invitation_message);
    assert_eq!(config.timeout_seconds, 15);
    assert_eq!(config.token_skew_seconds, 30);
    assert_eq!(config.max_attempts, 3);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
tenant_id = "fabrikam"
client_id = "app"
client_secret = "toml-secret"
max_attempts = 2
"#;
    let path = write_config(toml_content, "toml");

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_ok(), "Failed to load config from TOML file");

    let config = result.unwrap();

    assert_eq!(config.tenant_id, "fabrikam");
    assert_eq!(config.client_secret.expose(), "toml-secret");
    assert_eq!(config.max_attempts, 2);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_with_minimal_fields() {
    let json_content = r#"{"tenant_id": "t", "client_id": "c", "client_secret": "s"}"#;
    let path = write_config(json_content, "json");

    let config = config::load_from_file(Some(path.clone())).expect("minimal config");

    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.scope, DEFAULT_SCOPE);
    assert_eq!(config.timeout_seconds, 120);
    assert_eq!(config.token_skew_seconds, 60);
    assert_eq!(config.max_attempts, 1);
    assert!(config.send_invitation_message);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_missing_credentials_fails_validation() {
    let json_content = r#"{"tenant_id": "t", "client_id": "c", "client_secret": "  "}"#;
    let path = write_config(json_content, "json");

    let result = config::load_from_file(Some(path.clone()));

    match result {
        Err(DirectoryError::Config { message }) => {
            assert!(message.contains("client_secret"), "Error should name the field");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }

    std::fs::remove_file(path).ok();
}

#[test]
fn test_loaded_secret_is_redacted_in_debug_output() {
    let json_content =
        r#"{"tenant_id": "t", "client_id": "c", "client_secret": "do-not-print-me"}"#;
    let path = write_config(json_content, "json");

    let config = config::load_from_file(Some(path.clone())).expect("config");
    let rendered = format!("{config:?}");

    assert!(!rendered.contains("do-not-print-me"), "Secret leaked into Debug output");

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/guestdir.json".into()));
    assert!(result.is_err(), "Should fail when file doesn't exist");

    match result {
        Err(DirectoryError::Config { message }) => {
            assert!(message.contains("not found"), "Error message should mention 'not found'");
        }
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let path = write_config(r#"{ "this is": "not valid" "#, "json");

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_err(), "Should fail with invalid JSON");

    match result {
        Err(DirectoryError::Config { message }) => {
            assert!(message.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        _ => panic!("Expected Config error"),
    }

    std::fs::remove_file(path).ok();
}
