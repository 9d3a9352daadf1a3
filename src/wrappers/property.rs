// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wrapper for property getters.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::serialize::serialize_value;
use super::{SharedReporter, WatchContext};
use crate::error::Result;
use crate::runtime::{Callable, SharedCallable};
use crate::types::{CallArgs, Value};

/// Watched property getter.
///
/// Invoked with the receiver only. Reports a single positional argument
/// (the receiver placeholder) and no named arguments. Installed back as a
/// property so attribute access keeps working.
pub struct LoggedProperty {
    getter: SharedCallable,
    context: WatchContext,
}

impl LoggedProperty {
    pub fn new(getter: SharedCallable, function_name: impl Into<String>, reporter: SharedReporter) -> Self {
        Self {
            getter,
            context: WatchContext::new(function_name, reporter),
        }
    }

    pub fn getter(&self) -> &SharedCallable {
        &self.getter
    }
}

#[async_trait]
impl Callable for LoggedProperty {
    fn name(&self) -> &str {
        self.getter.name()
    }

    fn qualname(&self) -> &str {
        self.getter.qualname()
    }

    async fn call(&self, args: CallArgs) -> Result<Value> {
        let receiver = args.receiver().map(serialize_value).into_iter().collect();
        self.context
            .observe(&self.getter, args, receiver, BTreeMap::new())
            .await
    }
}
