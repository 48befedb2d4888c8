// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use crate::types::{Condition, PasswordCharset};
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "credsmith.dev", version = "v1alpha1", kind = "DatabaseClaim")]
#[kube(namespaced)]
#[kube(status = "DatabaseClaimStatus")]
#[kube(shortname = "dbc")]
#[serde(rename_all = "camelCase")]
pub struct DatabaseClaimSpec {
    /// Username for database authentication
    pub username: String,
    /// Database name
    pub dbname: String,
    /// Database host (FQDN)
    pub dbhost: String,
    /// Port (defaults to 5432)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    /// Password length, 8..=128 (defaults to 30)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_length: Option<i32>,
    /// Character set for the generated password (defaults to hex)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_charset: Option<PasswordCharset>,
    /// Database scheme for composed URIs (defaults to "postgresql")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_type: Option<String>,
    /// Additional connection parameters, expected to carry a leading '?'
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_params: Option<String>,
    /// Overrides the secret name (defaults to metadata.name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

impl DatabaseClaim {
    /// Name of the secret this claim materializes
    pub fn secret_name(&self) -> String {
        self.spec
            .secret_name
            .clone()
            .unwrap_or_else(|| self.name_any())
    }

    pub fn password_length(&self) -> i32 {
        self.spec.password_length.unwrap_or(defaults::PASSWORD_LENGTH)
    }

    pub fn password_charset(&self) -> PasswordCharset {
        self.spec.password_charset.unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseClaimStatus {
    /// Name of the created secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}
