// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Registry of loaded scopes.
//!
//! The resolver never reaches into ambient process state: it queries a
//! [`SymbolRegistry`], whose iteration order decides which scope wins when a
//! name is defined in more than one.

use std::sync::{Arc, RwLock};

use super::{read_lock, write_lock, Scope};

/// Read-only view of the currently loaded scopes.
pub trait SymbolRegistry: Send + Sync {
    /// All loaded scopes, in registry iteration order.
    fn scopes(&self) -> Vec<Arc<Scope>>;

    /// Look up a scope by its fully-qualified name.
    fn scope(&self, name: &str) -> Option<Arc<Scope>> {
        self.scopes().into_iter().find(|scope| scope.name() == name)
    }
}

/// In-process registry; iteration order is load order.
#[derive(Debug, Default)]
pub struct LoadedScopes {
    scopes: RwLock<Vec<Arc<Scope>>>,
}

impl LoadedScopes {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a scope, returning the shared handle.
    ///
    /// Loading a scope whose name is already present replaces it in place,
    /// keeping its position in the iteration order.
    pub fn load(&self, scope: Scope) -> Arc<Scope> {
        let scope = Arc::new(scope);
        self.insert(Arc::clone(&scope));
        scope
    }

    /// Insert an already shared scope.
    pub fn insert(&self, scope: Arc<Scope>) {
        let mut scopes = write_lock(&self.scopes);
        match scopes.iter_mut().find(|s| s.name() == scope.name()) {
            Some(existing) => *existing = scope,
            None => scopes.push(scope),
        }
    }

    /// Number of loaded scopes.
    pub fn len(&self) -> usize {
        read_lock(&self.scopes).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of loaded scopes, in iteration order.
    pub fn scope_names(&self) -> Vec<String> {
        read_lock(&self.scopes)
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }
}

impl SymbolRegistry for LoadedScopes {
    fn scopes(&self) -> Vec<Arc<Scope>> {
        read_lock(&self.scopes).clone()
    }

    fn scope(&self, name: &str) -> Option<Arc<Scope>> {
        read_lock(&self.scopes)
            .iter()
            .find(|scope| scope.name() == name)
            .cloned()
    }
}
