//! Configuration loader
//!
//! Loads configuration from a file, then applies environment overrides.
//!
//! ## Loading Strategy
//! 1. Probe the standard locations for a config file (TOML or JSON)
//! 2. Fall back to defaults when none exists
//! 3. Apply `CDNGUARD_*` environment overrides
//! 4. Validate the result
//!
//! ## Environment Variables
//! - `CDNGUARD_MAX_RETRIES`: retries after the first attempt
//! - `CDNGUARD_BASE_DELAY_MS`: backoff base delay in milliseconds
//! - `CDNGUARD_MAX_DELAY_MS`: backoff cap in milliseconds
//! - `CDNGUARD_LOG_LEVEL`: console echo threshold (`debug`..`fatal`)
//! - `CDNGUARD_LOG_PATH`: JSON-lines log file (empty disables it)
//! - `CDNGUARD_LOG_FILTER`: `tracing` filter directives
//! - `CDNGUARD_LOG_JSON`: JSON console output (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./cdnguard.toml`, `./cdnguard.json` (current working directory)
//! 2. `./config.toml`, `./config.json` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use cdnguard_common::observability::LogLevel;
use tracing::{debug, info};

use super::Config;
use crate::errors::{InfraError, InfraResult};

pub const ENV_MAX_RETRIES: &str = "CDNGUARD_MAX_RETRIES";
pub const ENV_BASE_DELAY_MS: &str = "CDNGUARD_BASE_DELAY_MS";
pub const ENV_MAX_DELAY_MS: &str = "CDNGUARD_MAX_DELAY_MS";
pub const ENV_LOG_LEVEL: &str = "CDNGUARD_LOG_LEVEL";
pub const ENV_LOG_PATH: &str = "CDNGUARD_LOG_PATH";
pub const ENV_LOG_FILTER: &str = "CDNGUARD_LOG_FILTER";
pub const ENV_LOG_JSON: &str = "CDNGUARD_LOG_JSON";

const CONFIG_FILE_NAMES: [&str; 4] =
    ["cdnguard.toml", "cdnguard.json", "config.toml", "config.json"];

/// Load configuration: file (or defaults), then environment, then validation.
///
/// # Errors
/// Returns an [`InfraError`] if a found file cannot be read or parsed, an
/// override is malformed, or the result is inconsistent.
pub fn load() -> InfraResult<Config> {
    let config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            debug!("No config file found, using defaults");
            Config::default()
        }
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected by
/// extension (`.toml` or `.json`).
///
/// # Errors
/// Returns:
/// - [`InfraError::ConfigNotFound`] if the file (or any candidate) is missing
/// - [`InfraError::ConfigRead`] if it cannot be read
/// - [`InfraError::ConfigParse`] / [`InfraError::UnsupportedFormat`] for bad
///   contents
/// - [`InfraError::InvalidConfig`] for inconsistent values
pub fn load_from_file(path: Option<PathBuf>) -> InfraResult<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(InfraError::ConfigNotFound(p));
            }
            p
        }
        None => probe_config_paths()
            .ok_or_else(|| InfraError::ConfigNotFound(PathBuf::from(CONFIG_FILE_NAMES[0])))?,
    };

    info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|source| InfraError::ConfigRead { path: config_path.clone(), source })?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, by file extension.
fn parse_config(contents: &str, path: &Path) -> InfraResult<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    let parse_error = |format: &'static str, message: String| InfraError::ConfigParse {
        path: path.to_path_buf(),
        format,
        message,
    };

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
        "json" => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        other => Err(InfraError::UnsupportedFormat(other.to_string())),
    }
}

/// Probe the working directory, then the executable's directory, for a
/// config file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Apply `CDNGUARD_*` overrides from `lookup` (usually `std::env::var`).
///
/// Unset variables leave the value untouched.
///
/// # Errors
/// Returns [`InfraError::InvalidEnv`] naming the first malformed variable.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> InfraResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_MAX_RETRIES) {
        config.executor.max_retries = parse_env(ENV_MAX_RETRIES, &value)?;
    }
    if let Some(value) = lookup(ENV_BASE_DELAY_MS) {
        config.executor.base_delay = Duration::from_millis(parse_env(ENV_BASE_DELAY_MS, &value)?);
    }
    if let Some(value) = lookup(ENV_MAX_DELAY_MS) {
        config.executor.max_delay = Duration::from_millis(parse_env(ENV_MAX_DELAY_MS, &value)?);
    }
    if let Some(value) = lookup(ENV_LOG_LEVEL) {
        config.executor.console_level = parse_env::<LogLevel>(ENV_LOG_LEVEL, &value)?;
    }
    if let Some(value) = lookup(ENV_LOG_PATH) {
        let value = value.trim();
        config.logging.log_path = (!value.is_empty()).then(|| PathBuf::from(value));
    }
    if let Some(value) = lookup(ENV_LOG_FILTER) {
        config.logging.filter = value;
    }
    if let Some(value) = lookup(ENV_LOG_JSON) {
        config.logging.json = parse_bool(ENV_LOG_JSON, &value)?;
    }
    Ok(config)
}

fn parse_env<T>(key: &str, value: &str) -> InfraResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| InfraError::invalid_env(key, format!("{value:?}: {e}")))
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn parse_bool(key: &str, value: &str) -> InfraResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(InfraError::invalid_env(key, format!("{value:?} is not a boolean"))),
    }
}
