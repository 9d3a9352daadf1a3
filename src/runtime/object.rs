// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Types, members and instances.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use super::{read_lock, write_lock, SharedCallable};
use crate::error::{Result, RuntimeError};
use crate::types::{CallArgs, Value};

/// How a method binds its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Receives the instance as its first argument.
    Instance,
    /// Receives the type as its first argument, whether called through the type or an instance.
    Class,
    /// Receives no implicit argument.
    Static,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Instance => write!(f, "method"),
            Binding::Class => write!(f, "classmethod"),
            Binding::Static => write!(f, "staticmethod"),
        }
    }
}

/// A member of a type's attribute table.
#[derive(Clone)]
pub enum Member {
    Method {
        binding: Binding,
        func: SharedCallable,
    },
    /// Read-only property; the getter receives the instance only.
    Property(SharedCallable),
    Value(Value),
}

impl Member {
    /// The callable behind a method or property.
    pub fn callable(&self) -> Option<&SharedCallable> {
        match self {
            Self::Method { func, .. } => Some(func),
            Self::Property(getter) => Some(getter),
            Self::Value(_) => None,
        }
    }

    pub fn is_property(&self) -> bool {
        matches!(self, Self::Property(_))
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method { binding, func } => write!(f, "{binding}({})", func.qualname()),
            Self::Property(getter) => write!(f, "property({})", getter.qualname()),
            Self::Value(value) => write!(f, "Value({value:?})"),
        }
    }
}

/// A registered type.
pub struct TypeObject {
    name: String,
    qualname: String,
    members: RwLock<HashMap<String, Member>>,
}

impl TypeObject {
    /// Create a type with no members.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            qualname: name.clone(),
            name,
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Set the qualified name (for nested types).
    pub fn with_qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = qualname.into();
        self
    }

    /// Define a method under the callable's name.
    pub fn with_method(self, binding: Binding, func: SharedCallable) -> Self {
        self.set_member(func.name().to_string(), Member::Method { binding, func });
        self
    }

    /// Define a property under the getter's name.
    pub fn with_property(self, getter: SharedCallable) -> Self {
        self.set_member(getter.name().to_string(), Member::Property(getter));
        self
    }

    /// Define a plain class attribute.
    pub fn with_value(self, name: impl Into<String>, value: Value) -> Self {
        self.set_member(name, Member::Value(value));
        self
    }

    /// Finish building and share.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// Look up a member.
    pub fn get_member(&self, name: &str) -> Option<Member> {
        read_lock(&self.members).get(name).cloned()
    }

    /// Replace (or define) a member, returning the previous one.
    pub fn set_member(&self, name: impl Into<String>, member: Member) -> Option<Member> {
        write_lock(&self.members).insert(name.into(), member)
    }

    /// Names of all members, sorted.
    pub fn member_names(&self) -> Vec<String> {
        let mut names: Vec<String> = read_lock(&self.members).keys().cloned().collect();
        names.sort();
        names
    }

    /// Create an instance of this type.
    pub fn instantiate(self: &Arc<Self>) -> Arc<Instance> {
        Arc::new(Instance {
            class: Arc::clone(self),
            fields: RwLock::new(HashMap::new()),
        })
    }

    /// Call a member through the type.
    ///
    /// Class methods get the type prepended as receiver. Instance methods
    /// expect the instance to be passed explicitly as the first argument.
    pub async fn call(self: &Arc<Self>, name: &str, args: CallArgs) -> Result<Value> {
        match self.get_member(name) {
            Some(Member::Method { binding, func }) => {
                let args = match binding {
                    Binding::Class => args.with_receiver(Value::Type(Arc::clone(self))),
                    Binding::Instance => {
                        if !matches!(args.receiver(), Some(Value::Object(_))) {
                            return Err(RuntimeError::MissingReceiver(format!(
                                "{}.{}",
                                self.qualname, name
                            ))
                            .into());
                        }
                        args
                    }
                    Binding::Static => args,
                };
                func.call(args).await
            }
            Some(_) => Err(RuntimeError::not_callable(&self.qualname, name).into()),
            None => Err(RuntimeError::attribute(&self.qualname, name).into()),
        }
    }
}

impl fmt::Debug for TypeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeObject")
            .field("qualname", &self.qualname)
            .field("members", &self.member_names())
            .finish()
    }
}

/// An object of a registered type.
pub struct Instance {
    class: Arc<TypeObject>,
    fields: RwLock<HashMap<String, Value>>,
}

impl Instance {
    /// The type this object belongs to.
    pub fn class(&self) -> &Arc<TypeObject> {
        &self.class
    }

    /// Read an instance field (not a property).
    pub fn field(&self, name: &str) -> Option<Value> {
        read_lock(&self.fields).get(name).cloned()
    }

    /// Set an instance field.
    pub fn set_field(&self, name: impl Into<String>, value: impl Into<Value>) {
        write_lock(&self.fields).insert(name.into(), value.into());
    }

    /// Attribute access: properties first, then fields, then class values.
    pub async fn get(self: &Arc<Self>, name: &str) -> Result<Value> {
        match self.class.get_member(name) {
            Some(Member::Property(getter)) => {
                return getter
                    .call(CallArgs::new([Value::Object(Arc::clone(self))]))
                    .await;
            }
            Some(Member::Method { .. }) => {
                return Err(RuntimeError::InvalidArgument(format!(
                    "'{}.{}' is a method; use call_method",
                    self.class.qualname(),
                    name
                ))
                .into());
            }
            Some(Member::Value(value)) => {
                if let Some(field) = self.field(name) {
                    return Ok(field);
                }
                return Ok(value);
            }
            None => {}
        }
        self.field(name)
            .ok_or_else(|| RuntimeError::attribute(self.class.qualname(), name).into())
    }

    /// Call a method through the instance, binding the receiver the way the member expects.
    pub async fn call_method(self: &Arc<Self>, name: &str, args: CallArgs) -> Result<Value> {
        match self.class.get_member(name) {
            Some(Member::Method { binding, func }) => {
                let args = match binding {
                    Binding::Instance => args.with_receiver(Value::Object(Arc::clone(self))),
                    Binding::Class => args.with_receiver(Value::Type(Arc::clone(&self.class))),
                    Binding::Static => args,
                };
                func.call(args).await
            }
            Some(_) => Err(RuntimeError::not_callable(self.class.qualname(), name).into()),
            None => Err(RuntimeError::attribute(self.class.qualname(), name).into()),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object at {:p}>", self.class.name(), self)
    }
}
