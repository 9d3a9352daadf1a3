// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Class-qualified lookup (`TypeName.member`).

use super::FinderResult;
use crate::runtime::{Member, SymbolRegistry};

/// Find a method or property of a type reachable as a top-level attribute of any scope.
///
/// The name is split at its first `.`. Scopes are scanned in registry order
/// and the first type that has a matching method or property wins.
pub fn find_class_member(registry: &dyn SymbolRegistry, full_name: &str) -> FinderResult {
    let Some((type_name, member_name)) = full_name.split_once('.') else {
        return FinderResult::not_found();
    };

    for scope in registry.scopes() {
        let Some(owner) = scope.get_attr(type_name).and_then(|a| a.as_type().cloned()) else {
            continue;
        };

        match owner.get_member(member_name) {
            Some(Member::Property(getter)) => {
                return FinderResult::property(scope, owner, member_name, getter);
            }
            Some(Member::Method { binding, func }) => {
                return FinderResult::method(scope, owner, member_name, binding, func);
            }
            Some(Member::Value(_)) | None => continue,
        }
    }

    FinderResult::not_found()
}
