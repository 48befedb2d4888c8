// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! DatabaseClaim reconciler - materializes full connection-string secrets.
//!
//! Unlike the basic-auth reconciler, the data map is recomposed from the
//! current spec on every pass so host or username edits flow through; only
//! the generated password is pinned once written.

use crate::compose;
use crate::config::Config;
use crate::error::{CredsmithError, Result};
use crate::generate;
use crate::kubernetes::{
    ensure_secret, patch_status, EnsureRequest, SecretContents, SECRET_TYPE_BASIC_AUTH,
};
use crate::types::{Condition, DatabaseClaim, DatabaseClaimStatus};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{controller::Action, Controller},
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct DatabaseReconciler {
    client: Client,
    config: Config,
}

impl DatabaseReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let claims: Api<DatabaseClaim> = Api::all(self.client.clone());
        let secrets: Api<Secret> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(claims, WatcherConfig::default())
            .owns(secrets, WatcherConfig::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled database claim: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(claim: Arc<DatabaseClaim>, ctx: Arc<DatabaseReconciler>) -> Result<Action> {
    match tokio::time::timeout(ctx.config.reconcile_timeout, reconcile_inner(claim, &ctx)).await {
        Ok(result) => result,
        Err(_) => Err(CredsmithError::DeadlineExceeded),
    }
}

async fn reconcile_inner(claim: Arc<DatabaseClaim>, ctx: &DatabaseReconciler) -> Result<Action> {
    let name = claim.name_any();
    let namespace = claim.namespace().unwrap_or_default();

    if claim.metadata.deletion_timestamp.is_some() {
        return Ok(Action::await_change());
    }

    debug!("Reconciling database claim: {}/{}", namespace, name);

    let secret_name = claim.secret_name();
    let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), &namespace);
    let claims: Api<DatabaseClaim> = Api::namespaced(ctx.client.clone(), &namespace);
    let owner = claim
        .controller_owner_ref(&())
        .ok_or_else(|| CredsmithError::InvalidSpec("claim has no object name".to_string()))?;

    let request = EnsureRequest {
        name: &secret_name,
        marker: Some("password"),
        refresh: true,
        labels: claim.metadata.labels.as_ref(),
        annotations: claim.metadata.annotations.as_ref(),
        owner,
    };

    let ensured = ensure_secret(&secrets, &request, |preserved| {
        let password = match preserved {
            Some(existing) => String::from_utf8_lossy(&existing.0).into_owned(),
            None => generate::password(claim.password_length(), claim.password_charset())?,
        };
        Ok(SecretContents {
            secret_type: SECRET_TYPE_BASIC_AUTH,
            data: compose::database_data(&claim.spec, &password),
        })
    })
    .await;

    match ensured {
        Ok(result) => {
            let status = DatabaseClaimStatus {
                secret_name: Some(secret_name.clone()),
                conditions: Some(vec![Condition::ready()]),
            };
            patch_status(&claims, &name, &status).await?;
            info!(
                "Successfully reconciled database claim {}/{} (secret {}, {:?})",
                namespace, name, secret_name, result.outcome
            );
            Ok(Action::await_change())
        }
        Err(e) if e.is_terminal() => {
            let status = DatabaseClaimStatus {
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
    _claim: Arc<DatabaseClaim>,
    error: &CredsmithError,
    ctx: Arc<DatabaseReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    if error.is_terminal() {
        Action::await_change()
    } else {
        Action::requeue(ctx.config.requeue_interval)
    }
}
