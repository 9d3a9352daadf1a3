// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! Defines the partial configuration read from files and environment and
//! the resolved configuration the agent runs with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Default prodwatch server.
pub const DEFAULT_BASE_URL: &str = "https://getprodwatch.com";

/// Default application name reported to the server.
pub const DEFAULT_APP_NAME: &str = "default";

/// Default seconds between poll cycles.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::invalid("logFormat", format!("unknown format '{other}'"))),
        }
    }
}

/// Partial configuration, as found in a config file or the environment.
/// Can be defined in .prodwatch.json or .prodwatch.yaml in the working directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    /// Base URL of the prodwatch server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer token for the prodwatch API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Application name reported with every event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Seconds between poll cycles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,

    /// Timeout for outbound requests; unset means no timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    /// Log level or filter directive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Log output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Append logs to this file instead of stdout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    /// Overlay `other` on top of `self`; set fields in `other` win.
    pub fn merge(self, other: FileConfig) -> FileConfig {
        FileConfig {
            base_url: other.base_url.or(self.base_url),
            api_token: other.api_token.or(self.api_token),
            app_name: other.app_name.or(self.app_name),
            poll_interval_secs: other.poll_interval_secs.or(self.poll_interval_secs),
            request_timeout_ms: other.request_timeout_ms.or(self.request_timeout_ms),
            log_level: other.log_level.or(self.log_level),
            log_format: other.log_format.or(self.log_format),
            log_file: other.log_file.or(self.log_file),
        }
    }
}

/// Fully resolved agent configuration.
#[derive(Clone, PartialEq)]
pub struct AgentConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub app_name: String,
    pub poll_interval: Duration,
    pub request_timeout: Option<Duration>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::Text,
            log_file: None,
        }
    }
}

impl AgentConfig {
    /// Resolve a partial configuration on top of the defaults.
    pub fn from_partial(partial: FileConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let poll_interval = match partial.poll_interval_secs {
            Some(0) => {
                return Err(ConfigError::invalid("pollIntervalSecs", "must be greater than zero"))
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.poll_interval,
        };

        let base_url = partial
            .base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        if base_url.is_empty() {
            return Err(ConfigError::invalid("baseUrl", "must not be empty"));
        }

        Ok(Self {
            base_url,
            api_token: partial
                .api_token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            app_name: partial.app_name.unwrap_or(defaults.app_name),
            poll_interval,
            request_timeout: partial.request_timeout_ms.map(Duration::from_millis),
            log_level: partial.log_level.unwrap_or(defaults.log_level),
            log_format: partial.log_format.unwrap_or(defaults.log_format),
            log_file: partial.log_file,
        })
    }

    /// Set the API token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the application name.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// JSON view with the token redacted, for display.
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::json!({
            "baseUrl": self.base_url,
            "apiToken": self.api_token.as_ref().map(|_| "***"),
            "appName": self.app_name,
            "pollIntervalSecs": self.poll_interval.as_secs(),
            "requestTimeoutMs": self.request_timeout.map(|t| t.as_millis() as u64),
            "logLevel": self.log_level,
            "logFormat": self.log_format,
            "logFile": self.log_file,
        })
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("app_name", &self.app_name)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("log_file", &self.log_file)
            .finish()
    }
}
