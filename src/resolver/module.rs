// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Module-qualified lookup (`pkg.module.function`).

use super::FinderResult;
use crate::runtime::{Attribute, SymbolRegistry};

/// Find `function` in the scope named by everything before the last `.`.
pub fn find_module_function(registry: &dyn SymbolRegistry, full_name: &str) -> FinderResult {
    let Some((scope_name, attr_name)) = full_name.rsplit_once('.') else {
        return FinderResult::not_found();
    };

    let Some(scope) = registry.scope(scope_name) else {
        return FinderResult::not_found();
    };

    match scope.get_attr(attr_name) {
        Some(Attribute::Function(func)) => FinderResult::regular(scope, attr_name, func),
        _ => FinderResult::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FunctionType;
    use crate::runtime::{LoadedScopes, NativeFunction, Scope};
    use crate::types::Value;

    fn registry() -> LoadedScopes {
        let registry = LoadedScopes::new();
        registry.load(
            Scope::new("app.billing")
                .with_function(NativeFunction::new("charge", |_| Ok(Value::Null)).shared())
                .with_value("RATE", Value::from(0.2)),
        );
        registry
    }

    #[test]
    fn test_finds_nested_module_function() {
        let result = find_module_function(&registry(), "app.billing.charge");
        assert!(result.found());
        assert_eq!(result.function_type(), FunctionType::Regular);
        assert_eq!(result.scope().unwrap().name(), "app.billing");
        assert_eq!(result.attribute(), Some("charge"));
    }

    #[test]
    fn test_non_callable_attribute_is_not_found() {
        assert!(!find_module_function(&registry(), "app.billing.RATE").found());
    }

    #[test]
    fn test_unknown_module_or_attribute() {
        assert!(!find_module_function(&registry(), "app.shipping.charge").found());
        assert!(!find_module_function(&registry(), "app.billing.refund").found());
        assert!(!find_module_function(&registry(), "charge").found());
    }
}
