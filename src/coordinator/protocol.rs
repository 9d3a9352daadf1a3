// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wire payloads exchanged with the prodwatch server.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::resolver::FinderReport;

/// Path of the pending-names endpoint.
pub const PENDING_FUNCTION_NAMES_PATH: &str = "pending-function-names";

/// Path every event is posted to.
pub const EVENTS_PATH: &str = "events";

pub const EVENT_CONFIRM_WATCHER: &str = "confirm-watcher";
pub const EVENT_FAILED_WATCHER: &str = "failed-watcher";
pub const EVENT_LOG_FUNCTION_CALL: &str = "log-function-call";
pub const EVENT_ADD_PROCESS: &str = "add-process";

/// Response of the pending-names endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingFunctionNames {
    #[serde(default)]
    pub function_names: Vec<String>,
}

/// `confirm-watcher` / `failed-watcher` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatcherEvent {
    pub event_name: String,
    pub function_name: String,
    pub process_id: String,
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finder_result: Option<FinderReport>,
}

/// `log-function-call` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallEvent {
    pub event_name: String,
    pub function_name: String,
    pub process_id: String,
    pub app_name: String,
    pub args: Vec<String>,
    pub kwargs: BTreeMap<String, String>,
    pub execution_time_ms: f64,
    pub error: Option<String>,
}

/// `add-process` registration event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddProcessEvent {
    pub event_name: String,
    pub process_id: String,
    pub app_name: String,
    pub system_info: serde_json::Value,
}
