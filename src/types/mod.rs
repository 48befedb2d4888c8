// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types for the credsmith.dev API group.

pub mod basic;
pub mod bundle;
pub mod db;
pub mod guid;
pub mod redirect;

pub use basic::{BasicAuthClaim, BasicAuthClaimSpec, BasicAuthClaimStatus};
pub use bundle::{DatabaseBundle, DatabaseBundleSpec, DatabaseBundleStatus};
pub use db::{DatabaseClaim, DatabaseClaimSpec, DatabaseClaimStatus};
pub use guid::{GuidClaim, GuidClaimSpec, GuidClaimStatus};
pub use redirect::{SecretRedirect, SecretRedirectSpec, SecretRedirectStatus};

use serde::{Deserialize, Serialize};

/// API group shared by all credsmith resources
pub const API_GROUP: &str = "credsmith.dev";

/// Character sets available for generated passwords
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PasswordCharset {
    Alphanumeric,
    AsciiPrintable,
    #[default]
    Hex,
    Base64,
}

/// Formats available for generated GUIDs
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum GuidFormat {
    #[default]
    Uuidv4,
    Uuidv7,
    ShortUuid,
}

/// Status condition reported on every claim
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    /// Ready=True after a successful reconciliation
    pub fn ready() -> Self {
        Self {
            condition_type: "Ready".to_string(),
            status: "True".to_string(),
            reason: Some("Reconciled".to_string()),
            message: None,
        }
    }

    /// Ready=False for a terminal validation failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            condition_type: "Ready".to_string(),
            status: "False".to_string(),
            reason: Some("ValidationFailed".to_string()),
            message: Some(message.into()),
        }
    }
}
