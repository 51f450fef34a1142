//! Configuration loader
//!
//! Loads directory client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If credentials are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `GUESTDIR_TENANT_ID`: Directory tenant (required)
//! - `GUESTDIR_CLIENT_ID`: Application id (required)
//! - `GUESTDIR_CLIENT_SECRET`: Application secret (required)
//! - `GUESTDIR_BASE_URL`: Directory API base URL
//! - `GUESTDIR_AUTHORITY_URL`: Identity provider authority
//! - `GUESTDIR_SCOPE`: Token scope
//! - `GUESTDIR_INVITE_REDIRECT_URL`: Invitation redirect URL
//! - `GUESTDIR_SEND_INVITATION_MESSAGE`: Whether invitations are emailed
//!   (true/false)
//! - `GUESTDIR_TIMEOUT_SECONDS`: Per-request timeout
//! - `GUESTDIR_TOKEN_SKEW_SECONDS`: Seconds shaved off each token lifetime
//! - `GUESTDIR_MAX_ATTEMPTS`: Attempts per request (1 disables retry)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./guestdir.json` or `./guestdir.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use guestdir_domain::{DirectoryConfig, DirectoryError, Result};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["guestdir.json", "guestdir.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `DirectoryError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load() -> Result<DirectoryConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Credentials are required; every other setting falls back to its default.
///
/// # Errors
/// Returns `DirectoryError::Config` if required variables are missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<DirectoryConfig> {
    let mut config = DirectoryConfig::new(
        env_var("GUESTDIR_TENANT_ID")?,
        env_var("GUESTDIR_CLIENT_ID")?,
        env_var("GUESTDIR_CLIENT_SECRET")?,
    );

    if let Some(value) = env_opt("GUESTDIR_BASE_URL") {
        config.base_url = value;
    }
    if let Some(value) = env_opt("GUESTDIR_AUTHORITY_URL") {
        config.authority_url = value;
    }
    if let Some(value) = env_opt("GUESTDIR_SCOPE") {
        config.scope = value;
    }
    if let Some(value) = env_opt("GUESTDIR_INVITE_REDIRECT_URL") {
        config.invite_redirect_url = value;
    }
    config.send_invitation_message =
        env_bool("GUESTDIR_SEND_INVITATION_MESSAGE", config.send_invitation_message);
    if let Some(value) = env_parse("GUESTDIR_TIMEOUT_SECONDS")? {
        config.timeout_seconds = value;
    }
    if let Some(value) = env_parse("GUESTDIR_TOKEN_SKEW_SECONDS")? {
        config.token_skew_seconds = value;
    }
    if let Some(value) = env_parse("GUESTDIR_MAX_ATTEMPTS")? {
        config.max_attempts = value;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `DirectoryError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<DirectoryConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DirectoryError::config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DirectoryError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DirectoryError::config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `DirectoryError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<DirectoryConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DirectoryError::config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DirectoryError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(DirectoryError::config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./guestdir.{json,toml}`,
///    `./config.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_under(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_under(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_under(dir: &Path) -> Vec<PathBuf> {
    ["", "..", "../.."]
        .iter()
        .flat_map(|up| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(up).join(name)))
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `DirectoryError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        DirectoryError::config(format!("Missing required environment variable: {key}"))
    })
}

/// Non-blank environment variable, if set
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a numeric environment variable, if set
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| DirectoryError::config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
