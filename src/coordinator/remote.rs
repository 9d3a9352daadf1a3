// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Client for the prodwatch server.
//!
//! [`RemoteService`] is the seam between the coordinator and the network;
//! [`HttpRemote`] is the bearer-authenticated HTTP/JSON implementation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{redirect, Client};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::protocol::{
    AddProcessEvent, FunctionCallEvent, PendingFunctionNames, WatcherEvent, EVENTS_PATH,
    EVENT_ADD_PROCESS, EVENT_CONFIRM_WATCHER, EVENT_FAILED_WATCHER, EVENT_LOG_FUNCTION_CALL,
    PENDING_FUNCTION_NAMES_PATH,
};
use crate::config::AgentConfig;
use crate::error::{CoordinatorError, RemoteError};
use crate::resolver::FinderReport;
use crate::types::CallEvent;
use crate::wrappers::CallReporter;

/// Operations the coordinator needs from the prodwatch server.
///
/// Implementations are scoped to one process id and application name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Names the server wants watched in this process.
    async fn pending_function_names(&self) -> Result<Vec<String>, RemoteError>;

    /// Report a successful watch.
    async fn confirm_watcher(
        &self,
        function_name: &str,
        finder_result: Option<FinderReport>,
    ) -> Result<(), RemoteError>;

    /// Report a failed watch attempt.
    async fn failed_watcher(
        &self,
        function_name: &str,
        finder_result: Option<FinderReport>,
    ) -> Result<(), RemoteError>;

    /// Report one watched call.
    async fn log_function_call(&self, event: &CallEvent) -> Result<(), RemoteError>;

    /// Register this process; sent once at startup.
    async fn add_process(&self, system_info: &serde_json::Value) -> Result<(), RemoteError>;
}

/// HTTP/JSON implementation of [`RemoteService`].
pub struct HttpRemote {
    client: Client,
    base_url: String,
    process_id: Uuid,
    app_name: String,
}

impl HttpRemote {
    /// Build a client authenticated with the configured token.
    pub fn new(config: &AgentConfig, process_id: Uuid) -> Result<Self, CoordinatorError> {
        let token = config
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CoordinatorError::MissingToken)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| CoordinatorError::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::none());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CoordinatorError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            process_id,
            app_name: config.app_name.clone(),
        })
    }

    pub fn process_id(&self) -> Uuid {
        self.process_id
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST an event and map non-success statuses to [`RemoteError::Api`].
    async fn post_event<T: Serialize + Sync>(&self, endpoint: &str, payload: &T) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.url(EVENTS_PATH))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::api(endpoint, status.as_u16()));
        }
        debug!(endpoint, status = status.as_u16(), "Event accepted");
        Ok(())
    }

    fn watcher_event(
        &self,
        event_name: &str,
        function_name: &str,
        finder_result: Option<FinderReport>,
    ) -> WatcherEvent {
        WatcherEvent {
            event_name: event_name.to_string(),
            function_name: function_name.to_string(),
            process_id: self.process_id.to_string(),
            app_name: self.app_name.clone(),
            finder_result,
        }
    }
}

#[async_trait]
impl RemoteService for HttpRemote {
    async fn pending_function_names(&self) -> Result<Vec<String>, RemoteError> {
        let process_id = self.process_id.to_string();
        let response = self
            .client
            .get(self.url(PENDING_FUNCTION_NAMES_PATH))
            .query(&[("process_id", process_id.as_str()), ("app_name", self.app_name.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::api(PENDING_FUNCTION_NAMES_PATH, status.as_u16()));
        }

        let payload: PendingFunctionNames = response.json().await?;
        Ok(payload.function_names)
    }

    async fn confirm_watcher(
        &self,
        function_name: &str,
        finder_result: Option<FinderReport>,
    ) -> Result<(), RemoteError> {
        let payload = self.watcher_event(EVENT_CONFIRM_WATCHER, function_name, finder_result);
        self.post_event(EVENT_CONFIRM_WATCHER, &payload).await
    }

    async fn failed_watcher(
        &self,
        function_name: &str,
        finder_result: Option<FinderReport>,
    ) -> Result<(), RemoteError> {
        let payload = self.watcher_event(EVENT_FAILED_WATCHER, function_name, finder_result);
        self.post_event(EVENT_FAILED_WATCHER, &payload).await
    }

    async fn log_function_call(&self, event: &CallEvent) -> Result<(), RemoteError> {
        let payload = FunctionCallEvent {
            event_name: EVENT_LOG_FUNCTION_CALL.to_string(),
            function_name: event.function_name.clone(),
            process_id: self.process_id.to_string(),
            app_name: self.app_name.clone(),
            args: event.args.clone(),
            kwargs: event.kwargs.clone(),
            execution_time_ms: event.execution_time_ms,
            error: event.error.clone(),
        };
        self.post_event(EVENT_LOG_FUNCTION_CALL, &payload).await
    }

    async fn add_process(&self, system_info: &serde_json::Value) -> Result<(), RemoteError> {
        let payload = AddProcessEvent {
            event_name: EVENT_ADD_PROCESS.to_string(),
            process_id: self.process_id.to_string(),
            app_name: self.app_name.clone(),
            system_info: system_info.clone(),
        };
        self.post_event(EVENT_ADD_PROCESS, &payload).await?;
        info!(url = %self.url(EVENTS_PATH), "Successfully connected to prodwatch server");
        Ok(())
    }
}

/// Relays wrapper telemetry to the server as `log-function-call` events.
pub struct RemoteReporter {
    remote: Arc<dyn RemoteService>,
}

impl RemoteReporter {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl CallReporter for RemoteReporter {
    async fn report(&self, event: CallEvent) -> anyhow::Result<()> {
        self.remote.log_function_call(&event).await?;
        Ok(())
    }
}
