// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the prodwatch agent.
//!
//! This module provides strongly-typed errors for different parts of the agent,
//! using `thiserror` for ergonomic error definitions and `anyhow` for error propagation.
//!
//! A resolution miss is not an error: it is reported as a
//! [`FinderResult`](crate::resolver::FinderResult) with `found == false`.

use thiserror::Error;

/// Errors raised by the in-process symbol runtime when a call site cannot be dispatched.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("'{owner}' has no attribute '{name}'")]
    AttributeNotFound { owner: String, name: String },

    #[error("'{owner}.{name}' is not callable")]
    NotCallable { owner: String, name: String },

    #[error("'{0}' requires a receiver as its first argument")]
    MissingReceiver(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl RuntimeError {
    /// Create an attribute-not-found error.
    pub fn attribute(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AttributeNotFound {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Create a not-callable error.
    pub fn not_callable(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotCallable {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// Errors talking to the remote coordination service.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Error from {endpoint}: status {status}")]
    Api { endpoint: String, status: u16 },

    #[error("Response parsing error: {0}")]
    Parse(String),
}

impl RemoteError {
    /// Create an API error for a non-success status.
    pub fn api(endpoint: impl Into<String>, status: u16) -> Self {
        Self::Api {
            endpoint: endpoint.into(),
            status,
        }
    }

    /// Check whether the error came from the transport rather than the service.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Api {
                endpoint: err
                    .url()
                    .map(|u| u.path().trim_start_matches('/').to_string())
                    .unwrap_or_default(),
                status: status.as_u16(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors building or driving the [`Coordinator`](crate::coordinator::Coordinator).
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("PRODWATCH_API_TOKEN environment variable is required")]
    MissingToken,

    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Process is not registered with the prodwatch server")]
    NotRegistered,
}

impl CoordinatorError {
    /// Check if this error is a credential problem.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::MissingToken | Self::InvalidToken(_))
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl ConfigError {
    /// Create an invalid value error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// Result type alias using anyhow for flexible error handling.
///
/// Watched callables return this so that their own error values pass through
/// wrappers untouched.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_display() {
        let err = RuntimeError::attribute("billing", "charge");
        assert_eq!(err.to_string(), "'billing' has no attribute 'charge'");

        let err = RuntimeError::not_callable("Account", "balance");
        assert_eq!(err.to_string(), "'Account.balance' is not callable");
    }

    #[test]
    fn test_remote_error_api() {
        let err = RemoteError::api("confirm-watcher", 500);
        match &err {
            RemoteError::Api { endpoint, status } => {
                assert_eq!(endpoint, "confirm-watcher");
                assert_eq!(*status, 500);
            }
            _ => panic!("Expected Api error"),
        }
        assert!(!err.is_transport());
        assert!(RemoteError::Network("refused".to_string()).is_transport());
    }

    #[test]
    fn test_coordinator_error_auth() {
        assert!(CoordinatorError::MissingToken.is_auth_error());
        assert!(CoordinatorError::InvalidToken("bad".to_string()).is_auth_error());
        assert!(!CoordinatorError::NotRegistered.is_auth_error());
    }

    #[test]
    fn test_config_error_from_json() {
        let result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid json");
        let json_err = result.unwrap_err();
        let config_err: ConfigError = json_err.into();
        assert!(matches!(config_err, ConfigError::JsonError(_)));
    }

    #[test]
    fn test_config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::NotFound(_)));
    }
}
