// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Credential Strategy Selection and Auth Materialization
//
// Two mutually-exclusive strategies produce the ready-to-send form of an
// InvokeModel request: a pre-issued bearer token, or a SigV4 signature over
// the exact bytes that go on the wire. Selection is a pure decision over the
// config provider; missing IAM credentials only surface at signing time.

pub mod sigv4;

use crate::domain::chat::InvokeError;
use crate::infrastructure::config::{keys, ConfigProvider};
use url::Url;

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ACCEPT: &str = "Accept";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_GUARDRAIL_IDENTIFIER: &str = "X-Amzn-Bedrock-GuardrailIdentifier";
pub const HEADER_GUARDRAIL_VERSION: &str = "X-Amzn-Bedrock-GuardrailVersion";

/// The fully authenticated, ready-to-send form of a request. Produced fresh
/// per attempt; signatures are time- and body-bound so this is never cached.
///
/// The body bytes here are the bytes the signature was computed over —
/// callers must transmit them verbatim.
#[derive(Debug, Clone)]
pub struct AuthMaterial {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl AuthMaterial {
    /// Case-insensitive header lookup (names are stored case-preserving).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStrategy {
    BearerToken,
    RequestSigning,
}

/// Pure strategy decision: bearer wins whenever a non-empty token is
/// configured, otherwise fall back to request signing.
pub fn select_strategy(config: &dyn ConfigProvider) -> CredentialStrategy {
    if config.get(keys::AWS_BEARER_TOKEN_BEDROCK).is_some() {
        CredentialStrategy::BearerToken
    } else {
        CredentialStrategy::RequestSigning
    }
}

/// A resolved model-endpoint target, split into the parts SigV4 signs over.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub host: String,
    pub path: String,
}

/// Resolve the InvokeModel URL for a model. `BEDROCK_ENDPOINT` overrides the
/// regional base; the model id is percent-encoded so the signed path matches
/// the wire path.
pub fn model_endpoint(
    config: &dyn ConfigProvider,
    region: &str,
    model_id: &str,
) -> Result<Endpoint, InvokeError> {
    let base = config
        .get(keys::BEDROCK_ENDPOINT)
        .unwrap_or_else(|| format!("https://bedrock-runtime.{region}.amazonaws.com"));
    let url = format!(
        "{}/model/{}/invoke",
        base.trim_end_matches('/'),
        sigv4::uri_encode(model_id)
    );

    let parsed = Url::parse(&url)
        .map_err(|_| InvokeError::MissingConfig(format!("invalid model endpoint URL: {url}")))?;
    let host = match (parsed.host_str(), parsed.port()) {
        (Some(h), Some(p)) => format!("{h}:{p}"),
        (Some(h), None) => h.to_string(),
        (None, _) => {
            return Err(InvokeError::MissingConfig(format!(
                "model endpoint URL has no host: {url}"
            )))
        }
    };
    let path = parsed.path().to_string();

    Ok(Endpoint { url, host, path })
}

/// Produce auth material under whichever strategy the configuration selects.
/// `body` is the exact serialized payload; signing mode binds the signature
/// to these bytes.
pub fn materialize(
    config: &dyn ConfigProvider,
    region: &str,
    model_id: &str,
    body: Vec<u8>,
    guardrail_identifier: Option<&str>,
    guardrail_version: Option<&str>,
) -> Result<AuthMaterial, InvokeError> {
    let endpoint = model_endpoint(config, region, model_id)?;
    match select_strategy(config) {
        CredentialStrategy::BearerToken => bearer_material(
            config,
            endpoint,
            body,
            guardrail_identifier,
            guardrail_version,
        ),
        CredentialStrategy::RequestSigning => sigv4::sign_request(
            config,
            region,
            endpoint,
            body,
            guardrail_identifier,
            guardrail_version,
        ),
    }
}

/// Bearer-token auth: static Authorization header, no transform of the body.
fn bearer_material(
    config: &dyn ConfigProvider,
    endpoint: Endpoint,
    body: Vec<u8>,
    guardrail_identifier: Option<&str>,
    guardrail_version: Option<&str>,
) -> Result<AuthMaterial, InvokeError> {
    let token = config.require(keys::AWS_BEARER_TOKEN_BEDROCK)?;

    let mut headers = vec![
        (HEADER_CONTENT_TYPE.to_string(), "application/json".to_string()),
        (HEADER_ACCEPT.to_string(), "application/json".to_string()),
        (HEADER_AUTHORIZATION.to_string(), format!("Bearer {token}")),
    ];
    if let Some(id) = guardrail_identifier {
        headers.push((HEADER_GUARDRAIL_IDENTIFIER.to_string(), id.to_string()));
    }
    if let Some(version) = guardrail_version {
        headers.push((HEADER_GUARDRAIL_VERSION.to_string(), version.to_string()));
    }

    Ok(AuthMaterial {
        url: endpoint.url,
        headers,
        body,
    })
}
