// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One poll cycle and the watched-name set it owns.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::remote::RemoteService;
use crate::error::RemoteError;
use crate::manager::FunctionManager;

/// Owner of the watched set.
///
/// Only the polling task holds a `PollWorker`, so the set needs no locking.
/// Names are only ever added: a failed watch leaves no trace and is retried
/// on the next cycle that lists it.
pub struct PollWorker {
    remote: Arc<dyn RemoteService>,
    functions: FunctionManager,
    watched: HashSet<String>,
}

impl PollWorker {
    pub fn new(remote: Arc<dyn RemoteService>, functions: FunctionManager) -> Self {
        Self {
            remote,
            functions,
            watched: HashSet::new(),
        }
    }

    /// Check if a name has been watched successfully.
    pub fn is_watched(&self, function_name: &str) -> bool {
        self.watched.contains(function_name)
    }

    /// Number of watched names.
    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }

    /// Run one cycle, logging and swallowing any failure.
    pub async fn run_cycle(&mut self) {
        if let Err(err) = self.poll().await {
            error!(error = %err, "Error polling prodwatch server");
        }
    }

    async fn poll(&mut self) -> Result<(), RemoteError> {
        let function_names = self.remote.pending_function_names().await?;
        debug!(count = function_names.len(), "Fetched pending function names");
        self.process_pending_watchers(function_names).await;
        Ok(())
    }

    /// Watch every name not already watched and report the outcome of each attempt.
    pub async fn process_pending_watchers(&mut self, function_names: Vec<String>) {
        for function_name in function_names {
            if self.watched.contains(&function_name) {
                continue;
            }

            let (success, finder_result) = self.functions.watch_function(&function_name);
            let report = Some(finder_result.to_report());

            if success {
                if let Err(err) = self.remote.confirm_watcher(&function_name, report).await {
                    error!(function = %function_name, error = %err, "Failed to confirm watcher");
                }
                info!(function = %function_name, "Watching function");
                self.watched.insert(function_name);
            } else {
                if let Err(err) = self.remote.failed_watcher(&function_name, report).await {
                    error!(function = %function_name, error = %err, "Failed to report failed watcher");
                }
                warn!(function = %function_name, "Watch attempt failed; will retry on next poll");
            }
        }
    }
}
