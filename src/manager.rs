// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Instrumentation manager: resolve, wrap and install one watched name.

use std::sync::Arc;
use tracing::{info, warn};

use crate::resolver::{resolve, FinderResult, ResolvedTarget};
use crate::runtime::{Attribute, Member, SymbolRegistry};
use crate::wrappers::{wrap, SharedReporter};

/// Installs telemetry wrappers in place of live callables.
pub struct FunctionManager {
    registry: Arc<dyn SymbolRegistry>,
    reporter: SharedReporter,
}

impl FunctionManager {
    /// Create a manager that resolves against `registry` and reports through `reporter`.
    pub fn new(registry: Arc<dyn SymbolRegistry>, reporter: SharedReporter) -> Self {
        Self { registry, reporter }
    }

    /// Watch `function_name`.
    ///
    /// On a miss nothing is changed and `(false, result)` is returned. On a hit
    /// the matching wrapper replaces the original with a single assignment in
    /// the owning scope or type. Watching an already-wrapped name wraps the
    /// wrapper again; callers are expected to deduplicate.
    pub fn watch_function(&self, function_name: &str) -> (bool, FinderResult) {
        info!(function = %function_name, "Setting up watch for function");
        let result = resolve(self.registry.as_ref(), function_name);

        if !result.found() {
            warn!(function = %function_name, "Function not found in any module");
            return (false, result);
        }

        let (Some(target), Some(attribute)) = (result.target(), result.attribute()) else {
            return (false, FinderResult::not_found());
        };

        let wrapper = wrap(target, function_name, Arc::clone(&self.reporter));

        match target {
            ResolvedTarget::Function(_) => {
                let Some(scope) = result.scope() else {
                    return (false, FinderResult::not_found());
                };
                info!(function = %function_name, module = %scope.name(), "Found regular function");
                scope.set_attr(attribute, Attribute::Function(wrapper));
            }
            ResolvedTarget::Method { binding, .. } => {
                let Some(owner) = result.owner() else {
                    return (false, FinderResult::not_found());
                };
                info!(function = %function_name, class = %owner.name(), binding = %binding, "Found method");
                owner.set_member(
                    attribute,
                    Member::Method {
                        binding: *binding,
                        func: wrapper,
                    },
                );
            }
            ResolvedTarget::Property(_) => {
                let Some(owner) = result.owner() else {
                    return (false, FinderResult::not_found());
                };
                info!(function = %function_name, class = %owner.name(), "Found property");
                owner.set_member(attribute, Member::Property(wrapper));
            }
        }

        info!(function = %function_name, "Successfully set up watch");
        (true, result)
    }
}
