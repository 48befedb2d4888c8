// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Status subresource helpers

use crate::error::Result;
use kube::api::{Patch, PatchParams};
use kube::Api;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Merge-patch a resource's status subresource.
///
/// Secret mutation happens before the status write in every reconciler, so
/// a crash in between is resolved by the next pass observing the already
/// generated marker and merely rewriting status.
pub async fn patch_status<K, S>(api: &Api<K>, name: &str, status: &S) -> Result<()>
where
    K: Clone + DeserializeOwned + Debug,
    S: Serialize,
{
    let patch = Patch::Merge(serde_json::json!({ "status": status }));
    api.patch_status(name, &PatchParams::default(), &patch).await?;
    Ok(())
}
