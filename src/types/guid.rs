// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::{Condition, GuidFormat};
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "credsmith.dev", version = "v1alpha1", kind = "GuidClaim")]
#[kube(namespaced)]
#[kube(status = "GuidClaimStatus")]
#[kube(shortname = "gc")]
#[serde(rename_all = "camelCase")]
pub struct GuidClaimSpec {
    /// GUID format (defaults to uuidv4)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<GuidFormat>,
    /// Overrides the secret name (defaults to metadata.name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

impl GuidClaim {
    /// Name of the secret this claim materializes
    pub fn secret_name(&self) -> String {
        self.spec
            .secret_name
            .clone()
            .unwrap_or_else(|| self.name_any())
    }

    pub fn format(&self) -> GuidFormat {
        self.spec.format.unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuidClaimStatus {
    /// Name of the created secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
    /// The generated GUID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}
