// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Process identity sent with the startup registration.
//!
//! The coordinator treats the identity as an opaque JSON blob; this module
//! provides the trait it is produced through and a default producer.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::net::ToSocketAddrs;

const UNKNOWN: &str = "unknown";

/// Time the identity module was first touched; used as the process start time.
static PROCESS_START: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Produces the opaque identity blob attached to `add-process`.
pub trait IdentityProvider: Send + Sync {
    fn identify(&self) -> serde_json::Value;
}

/// Fixed identity, mostly useful for tests and embedding.
impl IdentityProvider for serde_json::Value {
    fn identify(&self) -> serde_json::Value {
        self.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHardware {
    pub architecture: String,
    pub machine: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkIdentity {
    pub hostname: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEnvironment {
    pub agent_version: String,
    pub platform: String,
    pub working_directory: String,
    pub username: Option<String>,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessIdentity {
    pub pid: u32,
}

/// Everything reported about the running process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemIdentification {
    pub hardware: SystemHardware,
    pub network: NetworkIdentity,
    pub runtime: RuntimeEnvironment,
    pub process: ProcessIdentity,
    /// SHA-256 of host, architecture and working directory.
    pub fingerprint: String,
}

impl SystemIdentification {
    /// Collect from the current process. Never fails; unknown values are `"unknown"`.
    pub fn from_current_system() -> Self {
        let hostname = hostname();
        let working_directory = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| UNKNOWN.to_string());

        let fingerprint = {
            let mut hasher = Sha256::new();
            hasher.update(hostname.as_bytes());
            hasher.update(std::env::consts::ARCH.as_bytes());
            hasher.update(working_directory.as_bytes());
            format!("{:x}", hasher.finalize())
        };

        Self {
            hardware: SystemHardware {
                architecture: format!("{}bit", usize::BITS),
                machine: std::env::consts::ARCH.to_string(),
            },
            network: NetworkIdentity {
                ip_address: ip_address(&hostname),
                hostname,
            },
            runtime: RuntimeEnvironment {
                agent_version: crate::VERSION.to_string(),
                platform: format!("{}-{}", std::env::consts::OS, std::env::consts::FAMILY),
                working_directory,
                username: std::env::var("USER")
                    .or_else(|_| std::env::var("USERNAME"))
                    .ok(),
                start_time: *PROCESS_START,
            },
            process: ProcessIdentity {
                pid: std::process::id(),
            },
            fingerprint,
        }
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|h| h.trim().to_string())
        })
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn ip_address(hostname: &str) -> String {
    if hostname == UNKNOWN {
        return UNKNOWN.to_string();
    }
    (hostname, 0)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Default producer backed by [`SystemIdentification::from_current_system`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentityProvider for SystemIdentity {
    fn identify(&self) -> serde_json::Value {
        serde_json::to_value(SystemIdentification::from_current_system())
            .unwrap_or_else(|_| serde_json::json!({ "fingerprint": UNKNOWN }))
    }
}
