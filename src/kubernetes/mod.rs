// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities: CRD discovery, the shared secret ensure engine,
//! and status subresource helpers.

pub mod crds;
pub mod secrets;
pub mod status;

pub use crds::wait_for_claim_crds;
pub use secrets::{
    ensure_secret, EnsureOutcome, EnsureRequest, EnsureResult, SecretContents,
    SECRET_TYPE_BASIC_AUTH, SECRET_TYPE_OPAQUE,
};
pub use status::patch_status;
