// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! BasicAuthClaim reconciler - materializes username/password secrets.

use crate::compose;
use crate::config::Config;
use crate::error::{CredsmithError, Result};
use crate::generate;
use crate::kubernetes::{
    ensure_secret, patch_status, EnsureRequest, SecretContents, SECRET_TYPE_BASIC_AUTH,
};
use crate::types::{BasicAuthClaim, BasicAuthClaimStatus, Condition};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{controller::Action, Controller},
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct BasicAuthReconciler {
    client: Client,
    config: Config,
}

impl BasicAuthReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let claims: Api<BasicAuthClaim> = Api::all(self.client.clone());
        let secrets: Api<Secret> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(claims, WatcherConfig::default())
            .owns(secrets, WatcherConfig::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled basic-auth claim: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(claim: Arc<BasicAuthClaim>, ctx: Arc<BasicAuthReconciler>) -> Result<Action> {
    match tokio::time::timeout(ctx.config.reconcile_timeout, reconcile_inner(claim, &ctx)).await {
        Ok(result) => result,
        Err(_) => Err(CredsmithError::DeadlineExceeded),
    }
}

async fn reconcile_inner(claim: Arc<BasicAuthClaim>, ctx: &BasicAuthReconciler) -> Result<Action> {
    let name = claim.name_any();
    let namespace = claim.namespace().unwrap_or_default();

    if claim.metadata.deletion_timestamp.is_some() {
        return Ok(Action::await_change());
    }

    debug!("Reconciling basic-auth claim: {}/{}", namespace, name);

    let secret_name = claim.secret_name();
    let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), &namespace);
    let claims: Api<BasicAuthClaim> = Api::namespaced(ctx.client.clone(), &namespace);
    let owner = claim
        .controller_owner_ref(&())
        .ok_or_else(|| CredsmithError::InvalidSpec("claim has no object name".to_string()))?;

    let request = EnsureRequest {
        name: &secret_name,
        marker: Some("password"),
        refresh: false,
        labels: claim.metadata.labels.as_ref(),
        annotations: claim.metadata.annotations.as_ref(),
        owner,
    };

    let ensured = ensure_secret(&secrets, &request, |_| {
        let password = generate::password(claim.password_length(), claim.password_charset())?;
        Ok(SecretContents {
            secret_type: SECRET_TYPE_BASIC_AUTH,
            data: compose::basic_auth_data(&claim.spec.username, &password),
        })
    })
    .await;

    match ensured {
        Ok(result) => {
            let status = BasicAuthClaimStatus {
                secret_name: Some(secret_name.clone()),
                conditions: Some(vec![Condition::ready()]),
            };
            patch_status(&claims, &name, &status).await?;
            info!(
                "Successfully reconciled basic-auth claim {}/{} (secret {}, {:?})",
                namespace, name, secret_name, result.outcome
            );
            Ok(Action::await_change())
        }
        Err(e) if e.is_terminal() => {
            let status = BasicAuthClaimStatus {
                secret_name: None,
                conditions: Some(vec![Condition::failed(e.to_string())]),
            };
            patch_status(&claims, &name, &status).await?;
            Err(e)
        }
        Err(e) => Err(e),
    }
}

fn error_policy(
    _claim: Arc<BasicAuthClaim>,
    error: &CredsmithError,
    ctx: Arc<BasicAuthReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    if error.is_terminal() {
        Action::await_change()
    } else {
        Action::requeue(ctx.config.requeue_interval)
    }
}
