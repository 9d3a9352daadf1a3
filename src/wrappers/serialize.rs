// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Defensive argument serialization for call telemetry.
//!
//! Scalars become their string form. Everything else becomes a placeholder
//! naming its type plus the address of its shared allocation; object
//! contents are never serialized.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::types::{CallArgs, Value};

/// Serialize one value.
pub fn serialize_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(x) => format!("{x:?}"),
        Value::Str(s) => s.clone(),
        Value::List(items) => object_placeholder("list", items),
        Value::Map(entries) => object_placeholder("dict", entries),
        Value::Object(obj) => object_placeholder(obj.class().name(), obj),
        Value::Type(ty) => class_placeholder(ty.name()),
        Value::Scope(scope) => format!("<module '{}'>", scope.name()),
    }
}

/// Serialize positional and named arguments.
pub fn serialize_args(args: &CallArgs) -> (Vec<String>, BTreeMap<String, String>) {
    let positional = args.args.iter().map(serialize_value).collect();
    let named = args
        .kwargs
        .iter()
        .map(|(name, value)| (name.clone(), serialize_value(value)))
        .collect();
    (positional, named)
}

/// Placeholder for a type used as a receiver.
pub fn class_placeholder(type_name: &str) -> String {
    format!("<class '{type_name}'>")
}

/// Placeholder for an object: type name plus identity token.
pub fn object_placeholder<T: ?Sized>(type_name: &str, value: &Arc<T>) -> String {
    format!("<{type_name} object at {:p}>", Arc::as_ptr(value) as *const ())
}
