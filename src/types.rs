// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core types for the prodwatch agent.
//!
//! This module defines the values that flow through watched call sites and
//! the telemetry events produced for each watched invocation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::runtime::{Instance, Scope, TypeObject};

// ============================================================================
// Runtime Values
// ============================================================================

/// A dynamically-typed value passed to or returned from a [`Callable`](crate::runtime::Callable).
///
/// Scalars are held inline. Compound values and references are shared
/// allocations, so cloning a `Value` never copies an object's contents and
/// the allocation address can serve as an identity token.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Arc<Vec<Value>>),
    Map(Arc<BTreeMap<String, Value>>),
    /// An instance of a registered type.
    Object(Arc<Instance>),
    /// A registered type itself (the receiver of class methods).
    Type(Arc<TypeObject>),
    /// A loaded scope.
    Scope(Arc<Scope>),
}

impl Value {
    /// Build a list value.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(Arc::new(items.into_iter().collect()))
    }

    /// Build a map value.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Map(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Short name of the value's type, as shown in placeholders.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "dict",
            Self::Object(obj) => obj.class().name(),
            Self::Type(_) => "type",
            Self::Scope(_) => "module",
        }
    }

    /// Check if this is a scalar (inline) value.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Str(_)
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<Instance>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Arc<TypeObject>> {
        match self {
            Self::Type(ty) => Some(ty),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(i) => write!(f, "Int({i})"),
            Self::Float(x) => write!(f, "Float({x:?})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::List(items) => f.debug_tuple("List").field(items.as_ref()).finish(),
            Self::Map(entries) => f.debug_tuple("Map").field(entries.as_ref()).finish(),
            Self::Object(obj) => write!(f, "Object({})", obj.class().qualname()),
            Self::Type(ty) => write!(f, "Type({})", ty.qualname()),
            Self::Scope(scope) => write!(f, "Scope({})", scope.name()),
        }
    }
}

/// Scalars compare by value; shared values compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => Arc::ptr_eq(a, b),
            (Self::Map(a), Self::Map(b)) => Arc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Type(a), Self::Type(b)) => Arc::ptr_eq(a, b),
            (Self::Scope(a), Self::Scope(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Arc<Instance>> for Value {
    fn from(obj: Arc<Instance>) -> Self {
        Self::Object(obj)
    }
}

impl From<Arc<TypeObject>> for Value {
    fn from(ty: Arc<TypeObject>) -> Self {
        Self::Type(ty)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

// ============================================================================
// Call Arguments
// ============================================================================

/// Positional and named arguments of one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub args: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
}

impl CallArgs {
    /// Create call arguments from positional values.
    pub fn new(args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            args: args.into_iter().collect(),
            kwargs: BTreeMap::new(),
        }
    }

    /// Create call arguments with no values.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a named argument.
    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    /// Insert a receiver in front of the positional arguments.
    pub fn with_receiver(mut self, receiver: Value) -> Self {
        self.args.insert(0, receiver);
        self
    }

    /// Get a positional argument.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Get a named argument.
    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    /// Look up an argument by position, falling back to its keyword name.
    pub fn get(&self, index: usize, name: &str) -> Option<&Value> {
        self.arg(index).or_else(|| self.kwarg(name))
    }

    /// The implicit receiver of a method or property call.
    pub fn receiver(&self) -> Option<&Value> {
        self.args.first()
    }
}

// ============================================================================
// Telemetry Events
// ============================================================================

/// Telemetry for one invocation of a watched callable.
///
/// Produced once per call and forwarded immediately; never stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    /// Watched name the wrapper was installed for.
    pub function_name: String,
    /// Serialized positional arguments.
    pub args: Vec<String>,
    /// Serialized named arguments.
    pub kwargs: BTreeMap<String, String>,
    /// Wall-clock duration of the underlying call.
    pub execution_time_ms: f64,
    /// Message of the error the underlying call returned, if any.
    pub error: Option<String>,
}

impl CallEvent {
    /// Check if the underlying call failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
