// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The operator name used for logging and client identity
pub const OPERATOR_NAME: &str = "credsmith";

/// Generation defaults applied when a claim leaves a field unset
pub mod defaults {
    /// Password length when a claim does not set one
    pub const PASSWORD_LENGTH: i32 = 30;
    /// Database port
    pub const DB_PORT: i32 = 5432;
    /// Database scheme
    pub const DB_TYPE: &str = "postgresql";
    /// Fixed password length for bundle basic-auth secrets
    pub const BUNDLE_PASSWORD_LENGTH: i32 = 32;
}

/// Bounds accepted for generated credentials
pub mod limits {
    /// Minimum password length
    pub const PASSWORD_MIN: i32 = 8;
    /// Maximum password length
    pub const PASSWORD_MAX: i32 = 128;
}

/// Retry bounds for secret writes
pub mod retry {
    /// Attempts for a fetch-modify-write cycle before conflict exhaustion
    pub const CONFLICT_ATTEMPTS: u32 = 3;
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRDs
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
