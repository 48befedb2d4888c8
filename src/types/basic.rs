// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use crate::types::{Condition, PasswordCharset};
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "credsmith.dev", version = "v1alpha1", kind = "BasicAuthClaim")]
#[kube(namespaced)]
#[kube(status = "BasicAuthClaimStatus")]
#[kube(shortname = "bac")]
#[serde(rename_all = "camelCase")]
pub struct BasicAuthClaimSpec {
    /// Username stored alongside the generated password
    pub username: String,
    /// Password length, 8..=128 (defaults to 30)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_length: Option<i32>,
    /// Character set for the generated password (defaults to hex)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_charset: Option<PasswordCharset>,
    /// Overrides the secret name (defaults to metadata.name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

impl BasicAuthClaim {
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
pub struct BasicAuthClaimStatus {
    /// Name of the created secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}
