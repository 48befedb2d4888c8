// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! DatabaseBundle reconciler - materializes a basic-auth secret and a
//! companion connection-string secret for one database application.
//!
//! The connection-string secret is derived from whatever credentials the
//! basic-auth secret ended up holding, so a pre-existing basic-auth secret
//! keeps feeding the pair.

use crate::compose;
use crate::config::Config;
use crate::constants::defaults;
use crate::error::{CredsmithError, Result};
use crate::generate;
use crate::kubernetes::{
    ensure_secret, patch_status, EnsureRequest, SecretContents, SECRET_TYPE_BASIC_AUTH,
    SECRET_TYPE_OPAQUE,
};
use crate::types::{Condition, DatabaseBundle, DatabaseBundleStatus, PasswordCharset};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{controller::Action, Controller},
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct BundleReconciler {
    client: Client,
    config: Config,
}

impl BundleReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let bundles: Api<DatabaseBundle> = Api::all(self.client.clone());
        let secrets: Api<Secret> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(bundles, WatcherConfig::default())
            .owns(secrets, WatcherConfig::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled database bundle: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(bundle: Arc<DatabaseBundle>, ctx: Arc<BundleReconciler>) -> Result<Action> {
    match tokio::time::timeout(ctx.config.reconcile_timeout, reconcile_inner(bundle, &ctx)).await {
        Ok(result) => result,
        Err(_) => Err(CredsmithError::DeadlineExceeded),
    }
}

async fn reconcile_inner(bundle: Arc<DatabaseBundle>, ctx: &BundleReconciler) -> Result<Action> {
    let name = bundle.name_any();
    let namespace = bundle.namespace().unwrap_or_default();

    if bundle.metadata.deletion_timestamp.is_some() {
        return Ok(Action::await_change());
    }

    debug!("Reconciling database bundle: {}/{}", namespace, name);

    let basic_name = bundle.basic_auth_secret_name();
    let uri_name = bundle.db_uri_secret_name();
    let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), &namespace);
    let bundles: Api<DatabaseBundle> = Api::namespaced(ctx.client.clone(), &namespace);
    let owner = bundle
        .controller_owner_ref(&())
        .ok_or_else(|| CredsmithError::InvalidSpec("bundle has no object name".to_string()))?;

    let basic = ensure_secret(
        &secrets,
        &EnsureRequest {
            name: &basic_name,
            marker: Some("password"),
            refresh: false,
            labels: None,
            annotations: None,
            owner: owner.clone(),
        },
        |_| {
            let password = generate::password(
                defaults::BUNDLE_PASSWORD_LENGTH,
                PasswordCharset::Alphanumeric,
            )?;
            Ok(SecretContents {
                secret_type: SECRET_TYPE_BASIC_AUTH,
                data: compose::basic_auth_data(&bundle.spec.username, &password),
            })
        },
    )
    .await?;

    let username = basic
        .data
        .get("username")
        .map(|v| String::from_utf8_lossy(&v.0).into_owned())
        .unwrap_or_else(|| bundle.spec.username.clone());
    let password = basic
        .marker_value
        .as_ref()
        .map(|v| String::from_utf8_lossy(&v.0).into_owned())
        .unwrap_or_default();

    ensure_secret(
        &secrets,
        &EnsureRequest {
            name: &uri_name,
            marker: None,
            refresh: true,
            labels: None,
            annotations: None,
            owner,
        },
        |_| {
            Ok(SecretContents {
                secret_type: SECRET_TYPE_OPAQUE,
                data: compose::bundle_db_uri_data(&bundle.spec, &username, &password),
            })
        },
    )
    .await?;

    let status = DatabaseBundleStatus {
        basic_auth_secret_name: Some(basic_name.clone()),
        db_uri_secret_name: Some(uri_name.clone()),
        conditions: Some(vec![Condition::ready()]),
    };
    patch_status(&bundles, &name, &status).await?;

    info!(
        "Successfully reconciled database bundle {}/{} (secrets {} and {})",
        namespace, name, basic_name, uri_name
    );

    Ok(Action::await_change())
}

fn error_policy(
    _bundle: Arc<DatabaseBundle>,
    error: &CredsmithError,
    ctx: Arc<BundleReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    if error.is_terminal() {
        Action::await_change()
    } else {
        Action::requeue(ctx.config.requeue_interval)
    }
}
