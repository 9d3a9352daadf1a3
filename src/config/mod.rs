// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration module for prodwatch.
//!
//! Handles loading and merging of configuration from multiple sources:
//! - Global config: ~/.prodwatch/config.json
//! - Workspace config: .prodwatch.json, .prodwatch.yaml, or prodwatch.config.json
//! - Environment: `PRODWATCH_*` variables
//! - Overrides: command-line arguments or embedding code
//!
//! Configuration is merged with precedence (overrides > env > workspace > global > defaults).

mod loader;
mod types;

pub use loader::{
    config_from_env, get_global_config_path, load_config_file, load_env_config,
    load_global_config, load_workspace_config, CONFIG_FILES, ENV_API_TOKEN, ENV_API_URL,
    ENV_APP_NAME, ENV_LOG_FILE, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_POLL_INTERVAL,
    ENV_REQUEST_TIMEOUT_MS, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE,
};

pub use types::{
    AgentConfig, FileConfig, LogFormat, DEFAULT_APP_NAME, DEFAULT_BASE_URL, DEFAULT_LOG_LEVEL,
    DEFAULT_POLL_INTERVAL_SECS,
};

use crate::error::ConfigError;
use std::path::Path;

/// Load and merge all configuration sources.
///
/// This is the main entry point for configuration loading.
pub fn load_config(dir: &Path, overrides: FileConfig) -> Result<AgentConfig, ConfigError> {
    let global = load_global_config()?.unwrap_or_default();
    let workspace = load_workspace_config(dir)?.unwrap_or_default();
    let env = load_env_config()?;

    AgentConfig::from_partial(global.merge(workspace).merge(env).merge(overrides))
}
