// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::Condition;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "credsmith.dev", version = "v1alpha1", kind = "SecretRedirect")]
#[kube(namespaced)]
#[kube(status = "SecretRedirectStatus")]
#[kube(shortname = "sr")]
#[serde(rename_all = "camelCase")]
pub struct SecretRedirectSpec {
    /// Name of the source secret to mirror
    pub secret_name: String,
    /// Name for the mirrored secret (defaults to <secretName>-redirect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_secret_name: Option<String>,
}

impl SecretRedirect {
    /// Name of the secret this redirect writes
    pub fn target_secret_name(&self) -> String {
        self.spec
            .target_secret_name
            .clone()
            .unwrap_or_else(|| format!("{}-redirect", self.spec.secret_name))
    }

    /// Resource version of the source secret recorded at the last sync
    pub fn last_synced_version(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.source_resource_version.as_deref())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretRedirectStatus {
    /// Name of the created secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_secret_name: Option<String>,
    /// Last processed resourceVersion of the source secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_resource_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}
