// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wrapper for methods.

use async_trait::async_trait;

use super::serialize::serialize_args;
use super::{SharedReporter, WatchContext};
use crate::error::Result;
use crate::runtime::{Binding, Callable, SharedCallable};
use crate::types::{CallArgs, Value};

/// Watched method.
///
/// The receiver arrives as the first positional argument: a type for class
/// methods (reported as `<class 'Name'>`), an instance for instance methods
/// (reported as `<Name object at 0x..>`), nothing for static methods. The
/// wrapper keeps the original binding so it can be installed back under it.
pub struct LoggedMethod {
    original: SharedCallable,
    binding: Binding,
    context: WatchContext,
}

impl LoggedMethod {
    pub fn new(
        original: SharedCallable,
        binding: Binding,
        function_name: impl Into<String>,
        reporter: SharedReporter,
    ) -> Self {
        Self {
            original,
            binding,
            context: WatchContext::new(function_name, reporter),
        }
    }

    /// Binding the wrapper must be installed with.
    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn original(&self) -> &SharedCallable {
        &self.original
    }
}

#[async_trait]
impl Callable for LoggedMethod {
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
