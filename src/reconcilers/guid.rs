// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! GuidClaim reconciler - materializes single-value GUID secrets.

use crate::compose;
use crate::config::Config;
use crate::error::{CredsmithError, Result};
use crate::generate;
use crate::kubernetes::{
    ensure_secret, patch_status, EnsureRequest, SecretContents, SECRET_TYPE_OPAQUE,
};
use crate::types::{Condition, GuidClaim, GuidClaimStatus};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{controller::Action, Controller},
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct GuidReconciler {
    client: Client,
    config: Config,
}

impl GuidReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let claims: Api<GuidClaim> = Api::all(self.client.clone());
        let secrets: Api<Secret> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(claims, WatcherConfig::default())
            .owns(secrets, WatcherConfig::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled guid claim: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(claim: Arc<GuidClaim>, ctx: Arc<GuidReconciler>) -> Result<Action> {
    match tokio::time::timeout(ctx.config.reconcile_timeout, reconcile_inner(claim, &ctx)).await {
        Ok(result) => result,
        Err(_) => Err(CredsmithError::DeadlineExceeded),
    }
}

async fn reconcile_inner(claim: Arc<GuidClaim>, ctx: &GuidReconciler) -> Result<Action> {
    let name = claim.name_any();
    let namespace = claim.namespace().unwrap_or_default();

    if claim.metadata.deletion_timestamp.is_some() {
        return Ok(Action::await_change());
    }

    debug!("Reconciling guid claim: {}/{}", namespace, name);

    let secret_name = claim.secret_name();
    let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), &namespace);
    let claims: Api<GuidClaim> = Api::namespaced(ctx.client.clone(), &namespace);
    let owner = claim
        .controller_owner_ref(&())
        .ok_or_else(|| CredsmithError::InvalidSpec("claim has no object name".to_string()))?;

    let request = EnsureRequest {
        name: &secret_name,
        marker: Some("guid"),
        refresh: false,
        labels: claim.metadata.labels.as_ref(),
        annotations: claim.metadata.annotations.as_ref(),
        owner,
    };

    let ensured = ensure_secret(&secrets, &request, |_| {
        let guid = generate::guid(claim.format())?;
        Ok(SecretContents {
            secret_type: SECRET_TYPE_OPAQUE,
            data: compose::guid_data(&guid),
        })
    })
    .await;

    match ensured {
        Ok(result) => {
            let guid = result
                .marker_value
                .as_ref()
                .map(|v| String::from_utf8_lossy(&v.0).into_owned());
            let status = GuidClaimStatus {
                secret_name: Some(secret_name.clone()),
                guid,
                conditions: Some(vec![Condition::ready()]),
            };
            patch_status(&claims, &name, &status).await?;
            info!(
                "Successfully reconciled guid claim {}/{} (secret {}, {:?})",
                namespace, name, secret_name, result.outcome
            );
            Ok(Action::await_change())
        }
        Err(e) if e.is_terminal() => {
            let status = GuidClaimStatus {
                secret_name: None,
                guid: None,
                conditions: Some(vec![Condition::failed(e.to_string())]),
            };
            patch_status(&claims, &name, &status).await?;
            Err(e)
        }
        Err(e) => Err(e),
    }
}

fn error_policy(
    _claim: Arc<GuidClaim>,
    error: &CredsmithError,
    ctx: Arc<GuidReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    if error.is_terminal() {
        Action::await_change()
    } else {
        Action::requeue(ctx.config.requeue_interval)
    }
}
