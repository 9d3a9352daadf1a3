// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Outcome of one resolution attempt.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::runtime::{Binding, Scope, SharedCallable, TypeObject};

/// Capability kind of a resolved target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunctionType {
    Regular,
    Method,
    Property,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionType::Regular => write!(f, "REGULAR"),
            FunctionType::Method => write!(f, "METHOD"),
            FunctionType::Property => write!(f, "PROPERTY"),
        }
    }
}

/// The live callable a name resolved to.
#[derive(Clone)]
pub enum ResolvedTarget {
    Function(SharedCallable),
    Method {
        binding: Binding,
        func: SharedCallable,
    },
    Property(SharedCallable),
}

impl ResolvedTarget {
    /// The underlying callable.
    pub fn callable(&self) -> &SharedCallable {
        match self {
            Self::Function(func) => func,
            Self::Method { func, .. } => func,
            Self::Property(getter) => getter,
        }
    }

    /// Method binding, for method targets.
    pub fn binding(&self) -> Option<Binding> {
        match self {
            Self::Method { binding, .. } => Some(*binding),
            _ => None,
        }
    }
}

impl fmt::Debug for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(func) => write!(f, "Function({})", func.qualname()),
            Self::Method { binding, func } => write!(f, "Method({binding}, {})", func.qualname()),
            Self::Property(getter) => write!(f, "Property({})", getter.qualname()),
        }
    }
}

/// Structured outcome of one resolution attempt.
///
/// Built per call and never cached. A result with `found == false` carries
/// no references at all; construct one only through [`FinderResult::not_found`].
#[derive(Clone, Debug)]
pub struct FinderResult {
    scope: Option<Arc<Scope>>,
    target: Option<ResolvedTarget>,
    function_type: FunctionType,
    owner: Option<Arc<TypeObject>>,
    attribute: Option<String>,
    found: bool,
}

impl FinderResult {
    /// A top-level function of `scope`, stored under `attribute`.
    pub fn regular(scope: Arc<Scope>, attribute: impl Into<String>, func: SharedCallable) -> Self {
        Self {
            scope: Some(scope),
            target: Some(ResolvedTarget::Function(func)),
            function_type: FunctionType::Regular,
            owner: None,
            attribute: Some(attribute.into()),
            found: true,
        }
    }

    /// A method of `owner`, reached through `scope`.
    pub fn method(
        scope: Arc<Scope>,
        owner: Arc<TypeObject>,
        attribute: impl Into<String>,
        binding: Binding,
        func: SharedCallable,
    ) -> Self {
        Self {
            scope: Some(scope),
            target: Some(ResolvedTarget::Method { binding, func }),
            function_type: FunctionType::Method,
            owner: Some(owner),
            attribute: Some(attribute.into()),
            found: true,
        }
    }

    /// A property of `owner`, reached through `scope`.
    pub fn property(
        scope: Arc<Scope>,
        owner: Arc<TypeObject>,
        attribute: impl Into<String>,
        getter: SharedCallable,
    ) -> Self {
        Self {
            scope: Some(scope),
            target: Some(ResolvedTarget::Property(getter)),
            function_type: FunctionType::Property,
            owner: Some(owner),
            attribute: Some(attribute.into()),
            found: true,
        }
    }

    /// The canonical miss.
    pub fn not_found() -> Self {
        Self {
            scope: None,
            target: None,
            function_type: FunctionType::Regular,
            owner: None,
            attribute: None,
            found: false,
        }
    }

    pub fn found(&self) -> bool {
        self.found
    }

    pub fn function_type(&self) -> FunctionType {
        self.function_type
    }

    /// Scope the target was found in.
    pub fn scope(&self) -> Option<&Arc<Scope>> {
        self.scope.as_ref()
    }

    pub fn target(&self) -> Option<&ResolvedTarget> {
        self.target.as_ref()
    }

    /// Owning type for methods and properties.
    pub fn owner(&self) -> Option<&Arc<TypeObject>> {
        self.owner.as_ref()
    }

    /// Attribute key the target is stored under in its owning scope or type.
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    pub fn is_property(&self) -> bool {
        matches!(self.target, Some(ResolvedTarget::Property(_)))
    }

    /// Serializable metadata for the remote service.
    pub fn to_report(&self) -> FinderReport {
        let callable = self.target.as_ref().map(ResolvedTarget::callable);
        FinderReport {
            found: self.found,
            function_type: self.function_type,
            module_name: self.scope.as_ref().map(|s| s.name().to_string()),
            module_file: self
                .scope
                .as_ref()
                .and_then(|s| s.file())
                .map(|p| p.display().to_string()),
            function_name: callable.map(|c| c.name().to_string()),
            function_qualname: callable.map(|c| c.qualname().to_string()),
            class_name: self.owner.as_ref().map(|t| t.name().to_string()),
            class_qualname: self.owner.as_ref().map(|t| t.qualname().to_string()),
            is_property: self.is_property(),
        }
    }
}

/// Wire form of a [`FinderResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderReport {
    pub found: bool,
    pub function_type: FunctionType,
    pub module_name: Option<String>,
    pub module_file: Option<String>,
    pub function_name: Option<String>,
    pub function_qualname: Option<String>,
    pub class_name: Option<String>,
    pub class_qualname: Option<String>,
    pub is_property: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::NativeFunction;
    use crate::types::Value;

    fn getter() -> SharedCallable {
        NativeFunction::new("area", |_| Ok(Value::from(4.0)))
            .with_qualname("Square.area")
            .shared()
    }

    #[test]
    fn test_not_found_is_empty() {
        let result = FinderResult::not_found();
        assert!(!result.found());
        assert!(result.scope().is_none());
        assert!(result.target().is_none());
        assert!(result.owner().is_none());
        assert!(result.attribute().is_none());
        assert_eq!(result.function_type(), FunctionType::Regular);
    }

    #[test]
    fn test_not_found_report() {
        let report = FinderResult::not_found().to_report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "found": false,
                "function_type": "REGULAR",
                "module_name": null,
                "module_file": null,
                "function_name": null,
                "function_qualname": null,
                "class_name": null,
                "class_qualname": null,
                "is_property": false,
            })
        );
    }

    #[test]
    fn test_property_report() {
        let scope = Arc::new(Scope::new("shapes").with_file("src/shapes.rs"));
        let owner = TypeObject::new("Square").shared();
        let result = FinderResult::property(scope, owner, "area", getter());

        let report = result.to_report();
        assert!(report.found);
        assert_eq!(report.function_type, FunctionType::Property);
        assert_eq!(report.module_name.as_deref(), Some("shapes"));
        assert_eq!(report.module_file.as_deref(), Some("src/shapes.rs"));
        assert_eq!(report.function_name.as_deref(), Some("area"));
        assert_eq!(report.function_qualname.as_deref(), Some("Square.area"));
        assert_eq!(report.class_name.as_deref(), Some("Square"));
        assert!(report.is_property);
    }

    #[test]
    fn test_method_target_binding() {
        let scope = Arc::new(Scope::new("shapes"));
        let owner = TypeObject::new("Square").shared();
        let result = FinderResult::method(scope, owner, "area", Binding::Class, getter());
        assert_eq!(result.target().unwrap().binding(), Some(Binding::Class));
        assert!(!result.is_property());
        assert_eq!(result.function_type().to_string(), "METHOD");
    }
}
