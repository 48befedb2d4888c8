// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::API_GROUP;
use kube::{discovery::Discovery, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const REQUIRED_KINDS: [&str; 5] = [
    "BasicAuthClaim",
    "DatabaseClaim",
    "GuidClaim",
    "SecretRedirect",
    "DatabaseBundle",
];

/// Wait for the claim CRDs to become available in the cluster.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_claim_crds(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_claim_crds_exist(client).await {
            Ok(true) => {
                info!("Claim CRDs ({}/v1alpha1) are available", API_GROUP);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "Claim CRDs ({}/v1alpha1) not yet available, waiting {} seconds...",
                    API_GROUP, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for claim CRDs: {}, retrying in {} seconds...",
                    e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Check if every claim CRD exists by attempting to discover the group.
async fn check_claim_crds_exist(client: &Client) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[API_GROUP])
        .run()
        .await?;

    for group in discovery.groups() {
        if group.name() == API_GROUP {
            let kinds: Vec<String> = group
                .recommended_resources()
                .into_iter()
                .map(|(ar, _)| ar.kind)
                .collect();
            return Ok(REQUIRED_KINDS
                .iter()
                .all(|kind| kinds.iter().any(|have| have == kind)));
        }
    }

    Ok(false)
}
