// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Callable trait and native function adapter.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{CallArgs, Value};

/// Anything that can be installed in a scope or type and invoked by name.
///
/// Functions, methods and property getters all implement this trait. A
/// method receives its receiver (instance or type) as the first positional
/// argument; a static method receives none.
///
/// # Example
///
/// ```rust,ignore
/// use prodwatch::runtime::{Callable, NativeFunction};
/// use prodwatch::types::{CallArgs, Value};
///
/// let double = NativeFunction::new("double", |args: CallArgs| {
///     let x = args.get(0, "x").and_then(Value::as_int).unwrap_or_default();
///     Ok(Value::Int(x * 2))
/// });
/// ```
#[async_trait]
pub trait Callable: Send + Sync {
    /// Short name of the callable.
    fn name(&self) -> &str;

    /// Qualified name (e.g. `Account.deposit`).
    fn qualname(&self) -> &str {
        self.name()
    }

    /// Invoke the callable.
    async fn call(&self, args: CallArgs) -> Result<Value>;
}

/// Shared handle to a callable.
pub type SharedCallable = Arc<dyn Callable>;

type NativeFn = dyn Fn(CallArgs) -> Result<Value> + Send + Sync;

/// A callable backed by a synchronous Rust closure.
pub struct NativeFunction {
    name: String,
    qualname: String,
    func: Box<NativeFn>,
}

impl NativeFunction {
    /// Create a native function.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(CallArgs) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            qualname: name.clone(),
            name,
            func: Box::new(func),
        }
    }

    /// Set the qualified name.
    pub fn with_qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = qualname.into();
        self
    }

    /// Wrap into a shared handle.
    pub fn shared(self) -> SharedCallable {
        Arc::new(self)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("qualname", &self.qualname)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Callable for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn qualname(&self) -> &str {
        &self.qualname
    }

    async fn call(&self, args: CallArgs) -> Result<Value> {
        (self.func)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_native_function_call() {
        let add = NativeFunction::new("add", |args: CallArgs| {
            let a = args.get(0, "a").and_then(Value::as_int).unwrap_or_default();
            let b = args.get(1, "b").and_then(Value::as_int).unwrap_or_default();
            Ok(Value::Int(a + b))
        });

        let result = add
            .call(CallArgs::new([Value::from(2)]).with_kwarg("b", 3))
            .await
            .unwrap();
        assert_eq!(result, Value::Int(5));
    }

    #[test]
    fn test_native_function_names() {
        let f = NativeFunction::new("deposit", |_| Ok(Value::Null)).with_qualname("Account.deposit");
        assert_eq!(f.name(), "deposit");
        assert_eq!(f.qualname(), "Account.deposit");

        let g = NativeFunction::new("plain", |_| Ok(Value::Null));
        assert_eq!(g.qualname(), "plain");
    }

    #[tokio::test]
    async fn test_native_function_error() {
        let f = NativeFunction::new("fail", |_| Err(anyhow::anyhow!("boom")));
        let err = f.call(CallArgs::empty()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
