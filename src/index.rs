// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reverse lookup from source secrets to the redirects that mirror them.
//!
//! Seeded from one full list at startup, then maintained incrementally as
//! redirects are reconciled. A lookup miss means the pair has never been
//! observed; callers fall back to a namespace scan and record the result,
//! so each source is scanned at most once.

use crate::error::Result;
use crate::types::SecretRedirect;
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    /// (namespace, source secret name) -> names of dependent redirects
    by_source: HashMap<(String, String), HashSet<String>>,
    /// (namespace, redirect name) -> source secret name, for removals
    by_redirect: HashMap<(String, String), String>,
}

#[derive(Default)]
pub struct RedirectIndex {
    inner: RwLock<Inner>,
}

impl RedirectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the index from a full list of redirects.
    pub async fn build(client: &Client) -> Result<Self> {
        let redirects: Api<SecretRedirect> = Api::all(client.clone());
        let list = redirects.list(&ListParams::default()).await?;

        let index = Self::new();
        for redirect in list.items {
            let namespace = redirect.namespace().unwrap_or_default();
            index
                .upsert(&namespace, &redirect.name_any(), &redirect.spec.secret_name)
                .await;
        }
        Ok(index)
    }

    /// Register or re-point a redirect. A redirect whose source changed is
    /// removed from its previous source's set.
    pub async fn upsert(&self, namespace: &str, redirect: &str, source: &str) {
        let mut inner = self.inner.write().await;
        let redirect_key = (namespace.to_string(), redirect.to_string());

        if let Some(previous) = inner.by_redirect.get(&redirect_key) {
            if previous != source {
                let previous_key = (namespace.to_string(), previous.clone());
                if let Some(set) = inner.by_source.get_mut(&previous_key) {
                    set.remove(redirect);
                }
            }
        }

        inner
            .by_source
            .entry((namespace.to_string(), source.to_string()))
            .or_default()
            .insert(redirect.to_string());
        inner.by_redirect.insert(redirect_key, source.to_string());
    }

    /// Drop a deleted redirect. Its source entry stays behind as an
    /// authoritative (possibly empty) set.
    pub async fn remove(&self, namespace: &str, redirect: &str) {
        let mut inner = self.inner.write().await;
        let redirect_key = (namespace.to_string(), redirect.to_string());
        if let Some(source) = inner.by_redirect.remove(&redirect_key) {
            let source_key = (namespace.to_string(), source);
            if let Some(set) = inner.by_source.get_mut(&source_key) {
                set.remove(redirect);
            }
        }
    }

    /// Redirects depending on a source secret. `None` is an index miss.
    pub async fn dependents(&self, namespace: &str, source: &str) -> Option<Vec<String>> {
        let inner = self.inner.read().await;
        inner
            .by_source
            .get(&(namespace.to_string(), source.to_string()))
            .map(|set| {
                let mut names: Vec<String> = set.iter().cloned().collect();
                names.sort();
                names
            })
    }

    /// Record a scan result so the next lookup for this source hits.
    pub async fn record_scan(&self, namespace: &str, source: &str, redirects: &[String]) {
        {
            let mut inner = self.inner.write().await;
            inner
                .by_source
                .entry((namespace.to_string(), source.to_string()))
                .or_default();
        }
        for redirect in redirects {
            self.upsert(namespace, redirect, source).await;
        }
    }

    /// Number of indexed redirects
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_redirect.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_miss_before_any_observation() {
        let index = RedirectIndex::new();
        assert_eq!(index.dependents("default", "db-creds").await, None);
    }

    #[tokio::test]
    async fn test_upsert_then_lookup() {
        let index = RedirectIndex::new();
        index.upsert("default", "mirror-a", "db-creds").await;
        index.upsert("default", "mirror-b", "db-creds").await;
        assert_eq!(
            index.dependents("default", "db-creds").await,
            Some(vec!["mirror-a".to_string(), "mirror-b".to_string()])
        );
        assert_eq!(index.len().await, 2);
    }

    #[tokio::test]
    async fn test_lookup_is_namespace_scoped() {
        let index = RedirectIndex::new();
        index.upsert("team-a", "mirror", "db-creds").await;
        assert_eq!(index.dependents("team-b", "db-creds").await, None);
    }

    #[tokio::test]
    async fn test_upsert_repoints_changed_source() {
        let index = RedirectIndex::new();
        index.upsert("default", "mirror", "old-creds").await;
        index.upsert("default", "mirror", "new-creds").await;
        assert_eq!(
            index.dependents("default", "old-creds").await,
            Some(vec![])
        );
        assert_eq!(
            index.dependents("default", "new-creds").await,
            Some(vec!["mirror".to_string()])
        );
    }

    #[tokio::test]
    async fn test_remove_leaves_authoritative_empty_set() {
        let index = RedirectIndex::new();
        index.upsert("default", "mirror", "db-creds").await;
        index.remove("default", "mirror").await;
        assert_eq!(index.dependents("default", "db-creds").await, Some(vec![]));
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_record_scan_caches_negative_result() {
        let index = RedirectIndex::new();
        index.record_scan("default", "plain-secret", &[]).await;
        assert_eq!(
            index.dependents("default", "plain-secret").await,
            Some(vec![])
        );
    }

    #[tokio::test]
    async fn test_record_scan_registers_found_redirects() {
        let index = RedirectIndex::new();
        index
            .record_scan("default", "db-creds", &["mirror".to_string()])
            .await;
        assert_eq!(
            index.dependents("default", "db-creds").await,
            Some(vec!["mirror".to_string()])
        );
    }
}
