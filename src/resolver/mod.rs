// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Name resolution.
//!
//! Maps a dotted name to a classified, live callable among the scopes of a
//! [`SymbolRegistry`]. Three shapes are tried in order:
//!
//! 1. Module-qualified functions (`app.billing.charge`)
//! 2. Class members (`Account.deposit`, `Account.balance`)
//! 3. Bare top-level functions in any scope (`charge`)
//!
//! Stages 2 and 3 scan scopes in registry iteration order and the first match
//! wins. When the same name is defined in several scopes the outcome depends
//! on that order; no other tie-break is applied.

mod class;
mod module;
mod result;

pub use class::find_class_member;
pub use module::find_module_function;
pub use result::{FinderReport, FinderResult, FunctionType, ResolvedTarget};

use tracing::debug;

use crate::runtime::{Attribute, SymbolRegistry};

/// Resolve `name` against the loaded scopes. Never fails; a miss is a
/// [`FinderResult::not_found`].
pub fn resolve(registry: &dyn SymbolRegistry, name: &str) -> FinderResult {
    if name.contains('.') {
        let result = find_module_function(registry, name);
        if result.found() {
            debug!(name, "Resolved as module function");
            return result;
        }

        let result = find_class_member(registry, name);
        if result.found() {
            debug!(name, kind = %result.function_type(), "Resolved as class member");
            return result;
        }
    }

    let result = find_function(registry, name);
    if result.found() {
        debug!(name, scope = ?result.scope().map(|s| s.name()), "Resolved as top-level function");
    } else {
        debug!(name, "Name did not resolve");
    }
    result
}

/// Find a top-level function named exactly `name` in any scope; first match wins.
pub fn find_function(registry: &dyn SymbolRegistry, name: &str) -> FinderResult {
    registry
        .scopes()
        .into_iter()
        .find_map(|scope| match scope.get_attr(name) {
            Some(Attribute::Function(func)) => Some(FinderResult::regular(scope, name, func)),
            _ => None,
        })
        .unwrap_or_else(FinderResult::not_found)
}
