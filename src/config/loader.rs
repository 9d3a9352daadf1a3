// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading from files and the environment.
//!
//! Handles loading configuration from JSON and YAML files in various locations
//! and overlaying `PRODWATCH_*` environment variables.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::FileConfig;

/// Config file names to search for (in order).
pub const CONFIG_FILES: &[&str] = &[".prodwatch.json", ".prodwatch.yaml", "prodwatch.config.json"];

/// Global config directory name.
pub const GLOBAL_CONFIG_DIR: &str = ".prodwatch";

/// Global config file name.
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "PRODWATCH_API_URL";
pub const ENV_API_TOKEN: &str = "PRODWATCH_API_TOKEN";
pub const ENV_APP_NAME: &str = "PRODWATCH_APP_NAME";
pub const ENV_POLL_INTERVAL: &str = "PRODWATCH_POLL_INTERVAL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "PRODWATCH_REQUEST_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "PRODWATCH_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "PRODWATCH_LOG_FORMAT";
pub const ENV_LOG_FILE: &str = "PRODWATCH_LOG_FILE";

/// Get the global config file path.
pub fn get_global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
}

/// Load global configuration from ~/.prodwatch/config.json.
pub fn load_global_config() -> Result<Option<FileConfig>, ConfigError> {
    let path = match get_global_config_path() {
        Some(p) => p,
        None => return Ok(None),
    };

    if !path.exists() {
        return Ok(None);
    }

    load_config_file(&path).map(Some)
}

/// Load workspace configuration from `dir`.
///
/// Searches for config files in the following order:
/// 1. .prodwatch.json
/// 2. .prodwatch.yaml
/// 3. prodwatch.config.json
pub fn load_workspace_config(dir: &Path) -> Result<Option<FileConfig>, ConfigError> {
    for filename in CONFIG_FILES {
        let path = dir.join(filename);
        if path.exists() {
            return load_config_file(&path).map(Some);
        }
    }
    Ok(None)
}

/// Load a configuration file (JSON or YAML).
pub fn load_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::from),
        _ => serde_json::from_str(&content).map_err(ConfigError::from),
    }
}

/// Read `PRODWATCH_*` variables through `lookup`.
///
/// Empty values are ignored.
pub fn config_from_env<F>(lookup: F) -> Result<FileConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let parse_u64 = |key: &str| -> Result<Option<u64>, ConfigError> {
        get(key)
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::invalid(key, e.to_string()))
            })
            .transpose()
    };

    Ok(FileConfig {
        base_url: get(ENV_API_URL),
        api_token: get(ENV_API_TOKEN),
        app_name: get(ENV_APP_NAME),
        poll_interval_secs: parse_u64(ENV_POLL_INTERVAL)?,
        request_timeout_ms: parse_u64(ENV_REQUEST_TIMEOUT_MS)?,
        log_level: get(ENV_LOG_LEVEL),
        log_format: get(ENV_LOG_FORMAT).map(|v| v.parse()).transpose()?,
        log_file: get(ENV_LOG_FILE).map(PathBuf::from),
    })
}

/// Read `PRODWATCH_*` variables from the process environment.
pub fn load_env_config() -> Result<FileConfig, ConfigError> {
    config_from_env(|key| std::env::var(key).ok())
}
