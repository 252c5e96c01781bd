// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Invocation Path Adapters
//
// One adapter per routing mode, both implementing the ModelInvoker domain
// trait and sharing the pure classifier in classify.rs.

pub mod classify;
pub mod direct;
pub mod gateway;

use crate::infrastructure::auth::AuthMaterial;
use std::time::Duration;

/// Uniform timeout across all outbound calls. On expiry the call is
/// abandoned and classified as a transport error; there is no retry.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the outbound POST carrying exactly the materialized headers and the
/// byte-identical body the signature was computed over.
pub(crate) fn post_material(
    client: &reqwest::Client,
    url: &str,
    headers: &[(String, String)],
    material: &AuthMaterial,
) -> reqwest::RequestBuilder {
    let mut builder = client
        .post(url)
        .timeout(REQUEST_TIMEOUT)
        .body(material.body.clone());
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
}
