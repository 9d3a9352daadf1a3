// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Logging setup for the agent and the binaries that embed it.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the host. [`init_telemetry`] is the one the `prodwatch` binary uses.
//!
//! ```rust,ignore
//! use prodwatch::telemetry::{init_telemetry, TelemetryConfig};
//!
//! // Buffered lines are flushed when the guard is dropped.
//! let _guard = init_telemetry(&TelemetryConfig::from_agent_config(&config))?;
//! ```

mod init;

pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard, MAX_LOG_FILES};
