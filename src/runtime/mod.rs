// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Loaded-symbol runtime.
//!
//! The process exposes everything that can be watched through this module:
//!
//! - [`Scope`] - a named module with an attribute table of functions, types and values
//! - [`TypeObject`] - a type with methods (instance, class or static) and properties
//! - [`Instance`] - an object of a registered type
//! - [`Callable`] - the async call interface shared by functions, methods and getters
//! - [`SymbolRegistry`] - the ordered set of loaded scopes the resolver scans
//!
//! Call sites always dispatch through the attribute tables (`Scope::call`,
//! `TypeObject::call`, `Instance::call_method`, `Instance::get`). Replacing an
//! attribute therefore redirects every call that starts afterwards, while a
//! call already in flight keeps the implementation it captured.

mod callable;
mod object;
mod registry;
mod scope;

pub use callable::{Callable, NativeFunction, SharedCallable};
pub use object::{Binding, Instance, Member, TypeObject};
pub use registry::{LoadedScopes, SymbolRegistry};
pub use scope::{Attribute, Scope};

/// Read a lock, recovering the data if a writer panicked.
pub(crate) fn read_lock<T>(lock: &std::sync::RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Write a lock, recovering the data if a writer panicked.
pub(crate) fn write_lock<T>(lock: &std::sync::RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(std::sync::PoisonError::into_inner)
}
