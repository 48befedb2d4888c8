// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use std::env;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// How long to wait before re-checking deferred work
    pub requeue_interval: Duration,
    /// Deadline for a single reconcile invocation
    pub reconcile_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let requeue_secs: u64 = env::var("REQUEUE_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        let timeout_secs: u64 = env::var("RECONCILE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        Ok(Config {
            requeue_interval: Duration::from_secs(requeue_secs),
            reconcile_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
