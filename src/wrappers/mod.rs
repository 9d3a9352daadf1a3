// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Telemetry-capturing wrappers.
//!
//! A wrapper is a [`Callable`] that stands in for a watched target. It times
//! the original call, serializes the arguments, hands a [`CallEvent`] to the
//! [`CallReporter`] and then returns exactly what the original returned.
//! Errors from the original are passed back as the same value; errors from
//! the reporter are logged and dropped.
//!
//! - [`LoggedFunction`] - top-level functions
//! - [`LoggedMethod`] - instance, class and static methods
//! - [`LoggedProperty`] - property getters

mod function;
mod method;
mod property;
pub mod serialize;

pub use function::LoggedFunction;
pub use method::LoggedMethod;
pub use property::LoggedProperty;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug_span, error, Instrument};

use crate::error::Result;
use crate::resolver::ResolvedTarget;
use crate::runtime::SharedCallable;
use crate::types::{CallArgs, CallEvent, Value};

/// Sink for call telemetry.
///
/// Called inline by every wrapped invocation, so its latency adds to the
/// latency of the watched call.
#[async_trait]
pub trait CallReporter: Send + Sync {
    /// Relay one call event.
    async fn report(&self, event: CallEvent) -> anyhow::Result<()>;
}

/// Shared handle to a reporter.
pub type SharedReporter = Arc<dyn CallReporter>;

/// Build the wrapper matching a resolved target.
pub fn wrap(target: &ResolvedTarget, function_name: &str, reporter: SharedReporter) -> SharedCallable {
    match target {
        ResolvedTarget::Function(func) => {
            Arc::new(LoggedFunction::new(Arc::clone(func), function_name, reporter))
        }
        ResolvedTarget::Method { binding, func } => Arc::new(LoggedMethod::new(
            Arc::clone(func),
            *binding,
            function_name,
            reporter,
        )),
        ResolvedTarget::Property(getter) => {
            Arc::new(LoggedProperty::new(Arc::clone(getter), function_name, reporter))
        }
    }
}

/// Name and reporter shared by every wrapper variant.
#[derive(Clone)]
pub(crate) struct WatchContext {
    function_name: String,
    reporter: SharedReporter,
}

impl WatchContext {
    pub(crate) fn new(function_name: impl Into<String>, reporter: SharedReporter) -> Self {
        Self {
            function_name: function_name.into(),
            reporter,
        }
    }

    pub(crate) fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Time `original`, report the outcome and hand the outcome back unchanged.
    pub(crate) async fn observe(
        &self,
        original: &SharedCallable,
        args: CallArgs,
        serialized_args: Vec<String>,
        serialized_kwargs: BTreeMap<String, String>,
    ) -> Result<Value> {
        let span = debug_span!("watched_call", function = %self.function_name);

        let start = Instant::now();
        let result = original.call(args).instrument(span).await;
        let execution_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let event = CallEvent {
            function_name: self.function_name.clone(),
            args: serialized_args,
            kwargs: serialized_kwargs,
            execution_time_ms,
            error: result.as_ref().err().map(ToString::to_string),
        };

        if let Err(err) = self.reporter.report(event).await {
            error!(
                function = %self.function_name,
                error = %err,
                "Error logging function call"
            );
        }

        result
    }
}
