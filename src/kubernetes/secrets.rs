// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Shared create-or-update engine for derived secrets.
//!
//! Every reconciler funnels its secret writes through [`ensure_secret`],
//! which owns the generate-once contract: a value stored under the marker
//! key is never regenerated, labels and annotations merge additively, and
//! nothing is written when the stored secret already matches.

use crate::constants::retry;
use crate::error::{CredsmithError, Result};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use k8s_openapi::ByteString;
use kube::api::{ObjectMeta, PostParams};
use kube::Api;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

pub const SECRET_TYPE_BASIC_AUTH: &str = "kubernetes.io/basic-auth";
pub const SECRET_TYPE_OPAQUE: &str = "Opaque";

/// Desired contents for a derived secret
pub struct SecretContents {
    pub secret_type: &'static str,
    pub data: BTreeMap<String, ByteString>,
}

/// What `ensure_secret` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    Updated,
    Unchanged,
}

pub struct EnsureRequest<'a> {
    pub name: &'a str,
    /// Key whose value, once written, is preserved for the life of the secret
    pub marker: Option<&'a str>,
    /// Recompose the data from the current spec even when the marker is
    /// present (the marker value itself stays preserved)
    pub refresh: bool,
    pub labels: Option<&'a BTreeMap<String, String>>,
    pub annotations: Option<&'a BTreeMap<String, String>>,
    pub owner: OwnerReference,
}

#[derive(Debug)]
pub struct EnsureResult {
    pub outcome: EnsureOutcome,
    /// Final value stored under the marker key, when one was requested
    pub marker_value: Option<ByteString>,
    /// Final data map on the secret
    pub data: BTreeMap<String, ByteString>,
}

/// Create or update a secret, composing its data at most once per marker.
///
/// `compose` receives the preserved marker value when one exists; it is
/// only invoked when data actually needs composing. The fetch-modify-write
/// cycle retries on write conflicts, bounded by `retry::CONFLICT_ATTEMPTS`.
#[instrument(skip_all, fields(secret = %request.name))]
pub async fn ensure_secret<F>(
    secrets: &Api<Secret>,
    request: &EnsureRequest<'_>,
    mut compose: F,
) -> Result<EnsureResult>
where
    F: FnMut(Option<&ByteString>) -> Result<SecretContents>,
{
    for _ in 0..retry::CONFLICT_ATTEMPTS {
        match secrets.get_opt(request.name).await? {
            None => {
                let contents = compose(None)?;
                let marker_value = request
                    .marker
                    .and_then(|m| contents.data.get(m).cloned());
                let secret = Secret {
                    metadata: ObjectMeta {
                        name: Some(request.name.to_string()),
                        labels: request.labels.cloned(),
                        annotations: request.annotations.cloned(),
                        owner_references: Some(vec![request.owner.clone()]),
                        ..Default::default()
                    },
                    type_: Some(contents.secret_type.to_string()),
                    data: Some(contents.data.clone()),
                    ..Default::default()
                };

                match secrets.create(&PostParams::default(), &secret).await {
                    Ok(_) => {
                        info!("Created secret {}", request.name);
                        return Ok(EnsureResult {
                            outcome: EnsureOutcome::Created,
                            marker_value,
                            data: contents.data,
                        });
                    }
                    Err(kube::Error::Api(err)) if err.code == 409 => {
                        debug!("Secret {} appeared concurrently, retrying", request.name);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Some(existing) => {
                let preserved = request
                    .marker
                    .and_then(|m| existing.data.as_ref().and_then(|d| d.get(m)).cloned());

                let mut desired = existing.clone();
                merge_metadata(&mut desired.metadata.labels, request.labels);
                merge_metadata(&mut desired.metadata.annotations, request.annotations);

                if preserved.is_none() || request.refresh {
                    let contents = compose(preserved.as_ref())?;
                    if desired.type_.is_none() {
                        desired.type_ = Some(contents.secret_type.to_string());
                    }
                    desired.data = Some(contents.data);
                }

                let marker_value = request
                    .marker
                    .and_then(|m| desired.data.as_ref().and_then(|d| d.get(m)).cloned());

                if desired.data == existing.data
                    && desired.metadata.labels == existing.metadata.labels
                    && desired.metadata.annotations == existing.metadata.annotations
                {
                    debug!("Secret {} already up to date", request.name);
                    return Ok(EnsureResult {
                        outcome: EnsureOutcome::Unchanged,
                        marker_value,
                        data: desired.data.unwrap_or_default(),
                    });
                }

                match secrets
                    .replace(request.name, &PostParams::default(), &desired)
                    .await
                {
                    Ok(_) => {
                        info!("Updated secret {}", request.name);
                        return Ok(EnsureResult {
                            outcome: EnsureOutcome::Updated,
                            marker_value,
                            data: desired.data.unwrap_or_default(),
                        });
                    }
                    Err(kube::Error::Api(err)) if err.code == 409 => {
                        debug!("Conflict updating secret {}, retrying", request.name);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    Err(CredsmithError::ConflictExhausted(request.name.to_string()))
}

/// Additive merge: keys from the claim are copied in, nothing is removed
fn merge_metadata(
    target: &mut Option<BTreeMap<String, String>>,
    extra: Option<&BTreeMap<String, String>>,
) {
    if let Some(extra) = extra.filter(|m| !m.is_empty()) {
        target
            .get_or_insert_with(BTreeMap::new)
            .extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{secret_json, MockService};

    fn owner() -> OwnerReference {
        OwnerReference {
            api_version: "credsmith.dev/v1alpha1".to_string(),
            kind: "BasicAuthClaim".to_string(),
            name: "app-creds".to_string(),
            uid: "uid-1234".to_string(),
            controller: Some(true),
            block_owner_deletion: Some(true),
            ..Default::default()
        }
    }

    fn contents(password: &str) -> SecretContents {
        SecretContents {
            secret_type: SECRET_TYPE_BASIC_AUTH,
            data: [
                ("username".to_string(), ByteString(b"app".to_vec())),
                (
                    "password".to_string(),
                    ByteString(password.as_bytes().to_vec()),
                ),
            ]
            .into(),
        }
    }

    #[tokio::test]
    async fn test_creates_missing_secret() {
        let mock = MockService::new().on_post(
            "/api/v1/namespaces/default/secrets",
            201,
            &secret_json("app-creds", "default", "1", &[("password", b"pw")]),
        );
        let secrets: Api<Secret> = Api::namespaced(mock.clone().into_client(), "default");

        let request = EnsureRequest {
            name: "app-creds",
            marker: Some("password"),
            refresh: false,
            labels: None,
            annotations: None,
            owner: owner(),
        };
        let result = ensure_secret(&secrets, &request, |preserved| {
            assert!(preserved.is_none());
            Ok(contents("generated"))
        })
        .await
        .unwrap();

        assert_eq!(result.outcome, EnsureOutcome::Created);
        assert_eq!(
            result.marker_value,
            Some(ByteString(b"generated".to_vec()))
        );
        assert_eq!(mock.write_count(), 1);
    }

    #[tokio::test]
    async fn test_existing_marker_skips_compose_and_write() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces/default/secrets/app-creds",
            200,
            &secret_json(
                "app-creds",
                "default",
                "7",
                &[("username", b"app"), ("password", b"stable")],
            ),
        );
        let secrets: Api<Secret> = Api::namespaced(mock.clone().into_client(), "default");

        let request = EnsureRequest {
            name: "app-creds",
            marker: Some("password"),
            refresh: false,
            labels: None,
            annotations: None,
            owner: owner(),
        };
        let result = ensure_secret(&secrets, &request, |_| {
            panic!("compose must not run when the marker is present")
        })
        .await
        .unwrap();

        assert_eq!(result.outcome, EnsureOutcome::Unchanged);
        assert_eq!(result.marker_value, Some(ByteString(b"stable".to_vec())));
        assert_eq!(mock.write_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_preserves_marker_value() {
        let mock = MockService::new()
            .on_get(
                "/api/v1/namespaces/default/secrets/app-creds",
                200,
                &secret_json(
                    "app-creds",
                    "default",
                    "7",
                    &[("username", b"old"), ("password", b"stable")],
                ),
            )
            .on_put(
                "/api/v1/namespaces/default/secrets/app-creds",
                200,
                &secret_json(
                    "app-creds",
                    "default",
                    "8",
                    &[("username", b"app"), ("password", b"stable")],
                ),
            );
        let secrets: Api<Secret> = Api::namespaced(mock.clone().into_client(), "default");

        let request = EnsureRequest {
            name: "app-creds",
            marker: Some("password"),
            refresh: true,
            labels: None,
            annotations: None,
            owner: owner(),
        };
        let result = ensure_secret(&secrets, &request, |preserved| {
            let password = String::from_utf8(preserved.unwrap().0.clone()).unwrap();
            assert_eq!(password, "stable");
            Ok(contents(&password))
        })
        .await
        .unwrap();

        assert_eq!(result.outcome, EnsureOutcome::Updated);
        assert_eq!(result.marker_value, Some(ByteString(b"stable".to_vec())));
        assert_eq!(mock.write_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_marker_composes_fresh_data() {
        let mock = MockService::new()
            .on_get(
                "/api/v1/namespaces/default/secrets/app-creds",
                200,
                &secret_json("app-creds", "default", "3", &[]),
            )
            .on_put(
                "/api/v1/namespaces/default/secrets/app-creds",
                200,
                &secret_json(
                    "app-creds",
                    "default",
                    "4",
                    &[("username", b"app"), ("password", b"fresh")],
                ),
            );
        let secrets: Api<Secret> = Api::namespaced(mock.clone().into_client(), "default");

        let request = EnsureRequest {
            name: "app-creds",
            marker: Some("password"),
            refresh: false,
            labels: None,
            annotations: None,
            owner: owner(),
        };
        let result = ensure_secret(&secrets, &request, |preserved| {
            assert!(preserved.is_none());
            Ok(contents("fresh"))
        })
        .await
        .unwrap();

        assert_eq!(result.outcome, EnsureOutcome::Updated);
        assert_eq!(mock.write_count(), 1);
    }

    #[tokio::test]
    async fn test_conflict_exhaustion_is_retryable() {
        let mock = MockService::new()
            .on_get(
                "/api/v1/namespaces/default/secrets/app-creds",
                200,
                &secret_json("app-creds", "default", "3", &[]),
            )
            .on_put(
                "/api/v1/namespaces/default/secrets/app-creds",
                409,
                r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"conflict","reason":"Conflict","code":409}"#,
            );
        let secrets: Api<Secret> = Api::namespaced(mock.clone().into_client(), "default");

        let request = EnsureRequest {
            name: "app-creds",
            marker: Some("password"),
            refresh: false,
            labels: None,
            annotations: None,
            owner: owner(),
        };
        let err = ensure_secret(&secrets, &request, |_| Ok(contents("pw")))
            .await
            .unwrap_err();

        assert!(matches!(err, CredsmithError::ConflictExhausted(_)));
        assert!(!err.is_terminal());
        // one PUT per attempt
        assert_eq!(mock.write_count(), 3);
    }

    #[tokio::test]
    async fn test_label_merge_is_additive() {
        let mut existing = crate::test_utils::make_secret(
            "app-creds",
            "default",
            Some("3"),
            &[("password", b"stable")],
        );
        existing.metadata.labels =
            Some([("kept".to_string(), "yes".to_string())].into());
        let mock = MockService::new()
            .on_get(
                "/api/v1/namespaces/default/secrets/app-creds",
                200,
                &serde_json::to_string(&existing).unwrap(),
            )
            .on_put(
                "/api/v1/namespaces/default/secrets/app-creds",
                200,
                &serde_json::to_string(&existing).unwrap(),
            );
        let secrets: Api<Secret> = Api::namespaced(mock.clone().into_client(), "default");

        let labels: BTreeMap<String, String> =
            [("added".to_string(), "yes".to_string())].into();
        let request = EnsureRequest {
            name: "app-creds",
            marker: Some("password"),
            refresh: false,
            labels: Some(&labels),
            annotations: None,
            owner: owner(),
        };
        let result = ensure_secret(&secrets, &request, |_| unreachable!())
            .await
            .unwrap();

        assert_eq!(result.outcome, EnsureOutcome::Updated);
        assert_eq!(mock.write_count(), 1);
    }
}
