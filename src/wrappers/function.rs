// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wrapper for top-level functions.

use async_trait::async_trait;

use super::serialize::serialize_args;
use super::{SharedReporter, WatchContext};
use crate::error::Result;
use crate::runtime::{Callable, SharedCallable};
use crate::types::{CallArgs, Value};

/// Watched top-level function. Arguments pass through untouched.
pub struct LoggedFunction {
    original: SharedCallable,
    context: WatchContext,
}

impl LoggedFunction {
    pub fn new(original: SharedCallable, function_name: impl Into<String>, reporter: SharedReporter) -> Self {
        Self {
            original,
            context: WatchContext::new(function_name, reporter),
        }
    }

    /// The callable being watched.
    pub fn original(&self) -> &SharedCallable {
        &self.original
    }

    /// Watched name reported with every event.
    pub fn function_name(&self) -> &str {
        self.context.function_name()
    }
}

#[async_trait]
impl Callable for LoggedFunction {
    fn name(&self) -> &str {
        self.original.name()
    }

    fn qualname(&self) -> &str {
        self.original.qualname()
    }

    async fn call(&self, args: CallArgs) -> Result<Value> {
        let (positional, named) = serialize_args(&args);
        self.context.observe(&self.original, args, positional, named).await
    }
}
