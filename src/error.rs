// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredsmithError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Random source unavailable: {0}")]
    RandomSource(String),

    #[error("Conflict retries exhausted updating secret: {0}")]
    ConflictExhausted(String),

    #[error("Reconciliation deadline exceeded")]
    DeadlineExceeded,

    #[error("Invalid spec: {0}")]
    InvalidSpec(String),

    #[error("Source secret has no 'uri' key: {0}")]
    MissingUriKey(String),

    #[error("Invalid source URI: {0}")]
    InvalidSourceUri(String),
}

impl CredsmithError {
    /// Terminal errors cannot self-heal without a spec change; the error
    /// policy must not requeue them.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::InvalidSpec(_) | Self::MissingUriKey(_) | Self::InvalidSourceUri(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CredsmithError>;
