// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};

use credsmith::config::Config;
use credsmith::index::RedirectIndex;
use credsmith::kubernetes::wait_for_claim_crds;
use credsmith::reconcilers::{
    BasicAuthReconciler, BundleReconciler, DatabaseReconciler, GuidReconciler, RedirectReconciler,
    SecretWatcher,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting credsmith operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: requeue_interval={:?} reconcile_timeout={:?}",
        config.requeue_interval, config.reconcile_timeout
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Wait for the claim CRDs before starting reconcilers
    info!("Waiting for claim CRDs to become available...");
    wait_for_claim_crds(&client).await?;

    // Seed the redirect reverse index before any watcher starts
    let index = Arc::new(RedirectIndex::build(&client).await?);
    info!("Redirect index seeded with {} entries", index.len().await);

    let basic = BasicAuthReconciler::new(client.clone(), config.clone());
    let db = DatabaseReconciler::new(client.clone(), config.clone());
    let guid = GuidReconciler::new(client.clone(), config.clone());
    let bundle = BundleReconciler::new(client.clone(), config.clone());
    let redirect = RedirectReconciler::new(client.clone(), config.clone(), Arc::clone(&index));
    let watcher = SecretWatcher::new(client.clone(), config, index);

    info!("Starting reconcilers...");

    // Run all reconcilers concurrently
    tokio::try_join!(
        basic.run(),
        db.run(),
        guid.run(),
        bundle.run(),
        redirect.run(),
        watcher.run()
    )?;

    // This should never be reached as reconcilers run forever
    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}
