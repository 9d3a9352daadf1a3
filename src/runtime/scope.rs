// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Scopes (modules) and their attribute tables.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::{read_lock, write_lock, SharedCallable, TypeObject};
use crate::error::{Result, RuntimeError};
use crate::types::{CallArgs, Value};

/// A top-level attribute of a scope.
#[derive(Clone)]
pub enum Attribute {
    Function(SharedCallable),
    Type(Arc<TypeObject>),
    Value(Value),
}

impl Attribute {
    /// Get the function if this attribute is one.
    pub fn as_function(&self) -> Option<&SharedCallable> {
        match self {
            Self::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Get the type if this attribute is one.
    pub fn as_type(&self) -> Option<&Arc<TypeObject>> {
        match self {
            Self::Type(ty) => Some(ty),
            _ => None,
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(func) => write!(f, "Function({})", func.qualname()),
            Self::Type(ty) => write!(f, "Type({})", ty.qualname()),
            Self::Value(value) => write!(f, "Value({value:?})"),
        }
    }
}

/// A loaded module: a fully-qualified name plus an attribute table.
pub struct Scope {
    name: String,
    file: Option<PathBuf>,
    attributes: RwLock<HashMap<String, Attribute>>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            attributes: RwLock::new(HashMap::new()),
        }
    }

    /// Set the source file the scope was loaded from.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Define a function under its own name.
    pub fn with_function(self, func: SharedCallable) -> Self {
        self.set_attr(func.name().to_string(), Attribute::Function(func));
        self
    }

    /// Define a type under its own name.
    pub fn with_type(self, ty: Arc<TypeObject>) -> Self {
        self.set_attr(ty.name().to_string(), Attribute::Type(ty));
        self
    }

    /// Define a plain value.
    pub fn with_value(self, name: impl Into<String>, value: Value) -> Self {
        self.set_attr(name, Attribute::Value(value));
        self
    }

    /// Fully-qualified scope name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source file, if known.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Look up an attribute.
    pub fn get_attr(&self, name: &str) -> Option<Attribute> {
        read_lock(&self.attributes).get(name).cloned()
    }

    /// Check if an attribute exists.
    pub fn has_attr(&self, name: &str) -> bool {
        read_lock(&self.attributes).contains_key(name)
    }

    /// Replace (or define) an attribute, returning the previous one.
    pub fn set_attr(&self, name: impl Into<String>, attribute: Attribute) -> Option<Attribute> {
        write_lock(&self.attributes).insert(name.into(), attribute)
    }

    /// Names of all attributes, sorted.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = read_lock(&self.attributes).keys().cloned().collect();
        names.sort();
        names
    }

    /// Call a function attribute through the attribute table.
    pub async fn call(&self, name: &str, args: CallArgs) -> Result<Value> {
        let func = match self.get_attr(name) {
            Some(Attribute::Function(func)) => func,
            Some(_) => return Err(RuntimeError::not_callable(&self.name, name).into()),
            None => return Err(RuntimeError::attribute(&self.name, name).into()),
        };
        func.call(args).await
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("file", &self.file)
            .field("attributes", &self.attribute_names())
            .finish()
    }
}
