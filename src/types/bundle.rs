// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::Condition;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "credsmith.dev", version = "v1alpha1", kind = "DatabaseBundle")]
#[kube(namespaced)]
#[kube(status = "DatabaseBundleStatus")]
#[kube(shortname = "dbb")]
#[serde(rename_all = "camelCase")]
pub struct DatabaseBundleSpec {
    /// Username for database authentication
    pub username: String,
    /// Database name
    pub dbname: String,
    /// Database host (FQDN)
    pub dbhost: String,
    /// Port (defaults to 5432)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

impl DatabaseBundle {
    /// Name of the basic-auth secret this bundle materializes
    pub fn basic_auth_secret_name(&self) -> String {
        format!("{}-basic-auth", self.name_any())
    }

    /// Name of the connection-string secret this bundle materializes
    pub fn db_uri_secret_name(&self) -> String {
        format!("{}-db-uri", self.name_any())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseBundleStatus {
    /// Name of the created basic-auth secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth_secret_name: Option<String>,
    /// Name of the created connection-string secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_uri_secret_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}
