// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Prodwatch - watch live functions on demand.
//!
//! An in-process agent that asks the prodwatch server which functions to
//! watch, swaps those callables for timing wrappers while the process keeps
//! running, and reports every subsequent call.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`runtime`] - Loaded scopes, types and callables that can be watched
//! - [`resolver`] - Dotted-name resolution against the loaded scopes
//! - [`wrappers`] - Telemetry wrappers for functions, methods and properties
//! - [`manager`] - Resolve, wrap and install in one step
//! - [`coordinator`] - Server registration, polling and reporting
//! - [`config`] - Configuration loading and merging
//! - [`telemetry`] - Logging setup
//! - [`types`] - Runtime values and call events
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prodwatch::runtime::{LoadedScopes, NativeFunction, Scope};
//!
//! let registry = Arc::new(LoadedScopes::new());
//! registry.load(Scope::new("billing").with_function(charge.shared()));
//!
//! // Keeps polling in the background until `stop()` or drop.
//! let agent = prodwatch::start_prodwatch("billing-service", registry).await;
//! ```

pub mod config;
pub mod coordinator;
pub mod demo;
pub mod error;
pub mod manager;
pub mod resolver;
pub mod runtime;
pub mod telemetry;
pub mod types;
pub mod wrappers;

// Re-export commonly used types at crate root
pub use coordinator::{start_prodwatch, start_with_config, Coordinator};
pub use error::{ConfigError, CoordinatorError, RemoteError, Result, RuntimeError};
pub use manager::FunctionManager;
pub use resolver::{resolve, FinderResult, FunctionType};
pub use types::{CallArgs, CallEvent, Value};

/// Agent version, reported with the process identity.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
