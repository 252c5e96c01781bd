// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// AWS SigV4 Request Signing
//
// Signs InvokeModel requests with IAM credentials: canonical request over
// method, encoded path, headers and the exact body bytes; HMAC-SHA256 key
// derivation over date/region/service; Authorization header assembly.
// Deterministic for a fixed timestamp — the public entry stamps the request
// with the current time, `sign_request_at` is the seam tests pin.

use crate::domain::chat::InvokeError;
use crate::infrastructure::auth::{
    AuthMaterial, Endpoint, HEADER_ACCEPT, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE,
    HEADER_GUARDRAIL_IDENTIFIER, HEADER_GUARDRAIL_VERSION,
};
use crate::infrastructure::config::{keys, ConfigProvider};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

const SERVICE: &str = "bedrock";
const ALGORITHM: &str = "AWS4-HMAC-SHA256";

pub const HEADER_AMZ_DATE: &str = "X-Amz-Date";
pub const HEADER_AMZ_CONTENT_SHA256: &str = "X-Amz-Content-Sha256";
pub const HEADER_AMZ_SECURITY_TOKEN: &str = "X-Amz-Security-Token";

/// Long-lived IAM credentials resolved from configuration.
#[derive(Debug, Clone)]
pub struct SigningCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
}

impl SigningCredentials {
    /// Fails with the configuration error the selector deferred: request
    /// signing was chosen but the IAM credentials are absent.
    pub fn from_config(config: &dyn ConfigProvider) -> Result<Self, InvokeError> {
        Ok(Self {
            access_key: config.require(keys::AWS_ACCESS_KEY_ID)?,
            secret_key: config.require(keys::AWS_SECRET_ACCESS_KEY)?,
            session_token: config.get(keys::AWS_SESSION_TOKEN),
        })
    }
}

/// Sign an InvokeModel request with the current timestamp.
pub fn sign_request(
    config: &dyn ConfigProvider,
    region: &str,
    endpoint: Endpoint,
    body: Vec<u8>,
    guardrail_identifier: Option<&str>,
    guardrail_version: Option<&str>,
) -> Result<AuthMaterial, InvokeError> {
    let credentials = SigningCredentials::from_config(config)?;
    Ok(sign_request_at(
        &credentials,
        region,
        endpoint,
        body,
        guardrail_identifier,
        guardrail_version,
        Utc::now(),
    ))
}

/// Sign an InvokeModel request at an explicit timestamp. Deterministic: the
/// same (credentials, region, endpoint, body, timestamp) always produce the
/// same signature, and any change to the body changes it.
pub fn sign_request_at(
    credentials: &SigningCredentials,
    region: &str,
    endpoint: Endpoint,
    body: Vec<u8>,
    guardrail_identifier: Option<&str>,
    guardrail_version: Option<&str>,
    at: DateTime<Utc>,
) -> AuthMaterial {
    let amz_date = at.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = at.format("%Y%m%d").to_string();
    let payload_hash = sha256_hex(&body);

    // Canonical headers: lowercase names, sorted. Everything listed here is
    // signed and must be transmitted unchanged.
    let mut canonical: Vec<(String, String)> = vec![
        ("accept".into(), "application/json".into()),
        ("content-type".into(), "application/json".into()),
        ("host".into(), endpoint.host.clone()),
        ("x-amz-content-sha256".into(), payload_hash.clone()),
        ("x-amz-date".into(), amz_date.clone()),
    ];
    if let Some(token) = &credentials.session_token {
        canonical.push(("x-amz-security-token".into(), token.clone()));
    }
    if let Some(id) = guardrail_identifier {
        canonical.push((HEADER_GUARDRAIL_IDENTIFIER.to_ascii_lowercase(), id.to_string()));
    }
    if let Some(version) = guardrail_version {
        canonical.push((HEADER_GUARDRAIL_VERSION.to_ascii_lowercase(), version.to_string()));
    }
    canonical.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers: String = canonical
        .iter()
        .map(|(n, v)| format!("{n}:{}\n", v.trim()))
        .collect();
    let signed_headers: String = canonical
        .iter()
        .map(|(n, _)| n.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "POST\n{}\n\n{}\n{}\n{}",
        endpoint.path, canonical_headers, signed_headers, payload_hash
    );

    let credential_scope = format!("{date_stamp}/{region}/{SERVICE}/aws4_request");
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{credential_scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let k_date = hmac_sha256(
        format!("AWS4{}", credentials.secret_key).as_bytes(),
        date_stamp.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes());
    let k_signing = hmac_sha256(&k_service, b"aws4_request");
    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

    let authorization = format!(
        "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}",
        credentials.access_key
    );

    let mut headers = vec![
        (HEADER_CONTENT_TYPE.to_string(), "application/json".to_string()),
        (HEADER_ACCEPT.to_string(), "application/json".to_string()),
        (HEADER_AMZ_DATE.to_string(), amz_date),
        (HEADER_AMZ_CONTENT_SHA256.to_string(), payload_hash),
    ];
    if let Some(token) = &credentials.session_token {
        headers.push((HEADER_AMZ_SECURITY_TOKEN.to_string(), token.clone()));
    }
    if let Some(id) = guardrail_identifier {
        headers.push((HEADER_GUARDRAIL_IDENTIFIER.to_string(), id.to_string()));
    }
    if let Some(version) = guardrail_version {
        headers.push((HEADER_GUARDRAIL_VERSION.to_string(), version.to_string()));
    }
    headers.push((HEADER_AUTHORIZATION.to_string(), authorization));

    AuthMaterial {
        url: endpoint.url,
        headers,
        body,
    }
}

/// Percent-encode a path segment per RFC 3986 (SigV4 canonical URI rules):
/// unreserved characters pass through, everything else is `%XX` with
/// uppercase hex.
pub(crate) fn uri_encode(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::auth::model_endpoint;
    use crate::infrastructure::config::StaticConfig;
    use chrono::TimeZone;

    fn test_credentials() -> SigningCredentials {
        SigningCredentials {
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            session_token: None,
        }
    }

    fn test_endpoint() -> Endpoint {
        model_endpoint(&StaticConfig::new(), "us-east-1", "meta.llama3-8b-instruct-v1:0").unwrap()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 0).unwrap()
    }

    fn sign(body: &[u8]) -> AuthMaterial {
        sign_request_at(
            &test_credentials(),
            "us-east-1",
            test_endpoint(),
            body.to_vec(),
            None,
            None,
            fixed_time(),
        )
    }

    #[test]
    fn test_signature_is_deterministic_for_fixed_inputs() {
        let a = sign(br#"{"prompt":"hello"}"#);
        let b = sign(br#"{"prompt":"hello"}"#);
        assert_eq!(a.header("authorization"), b.header("authorization"));
        assert_eq!(a.header("x-amz-date"), b.header("x-amz-date"));
    }

    #[test]
    fn test_different_bodies_produce_different_signatures() {
        let a = sign(br#"{"prompt":"hello"}"#);
        let b = sign(br#"{"prompt":"hellp"}"#);
        assert_ne!(a.header("authorization"), b.header("authorization"));
        assert_ne!(
            a.header("x-amz-content-sha256"),
            b.header("x-amz-content-sha256")
        );
    }

    #[test]
    fn test_authorization_header_shape() {
        let material = sign(b"{}");
        let auth = material.header("authorization").unwrap();
        assert!(auth.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20260115/us-east-1/bedrock/aws4_request"
        ));
        assert!(auth.contains("SignedHeaders=accept;content-type;host;x-amz-content-sha256;x-amz-date"));
        assert!(auth.contains("Signature="));
        assert_eq!(material.header("x-amz-date"), Some("20260115T123000Z"));
    }

    #[test]
    fn test_session_token_is_signed_and_emitted() {
        let mut credentials = test_credentials();
        credentials.session_token = Some("the-session-token".to_string());
        let material = sign_request_at(
            &credentials,
            "us-east-1",
            test_endpoint(),
            b"{}".to_vec(),
            None,
            None,
            fixed_time(),
        );
        assert_eq!(material.header("x-amz-security-token"), Some("the-session-token"));
        assert!(material
            .header("authorization")
            .unwrap()
            .contains("x-amz-security-token"));
    }

    #[test]
    fn test_guardrail_headers_are_signed_when_present() {
        let material = sign_request_at(
            &test_credentials(),
            "us-east-1",
            test_endpoint(),
            b"{}".to_vec(),
            Some("gr-1"),
            Some("2"),
            fixed_time(),
        );
        assert_eq!(material.header(HEADER_GUARDRAIL_IDENTIFIER), Some("gr-1"));
        assert!(material
            .header("authorization")
            .unwrap()
            .contains("x-amzn-bedrock-guardrailidentifier"));
    }

    #[test]
    fn test_missing_iam_credentials_fail_before_any_network_call() {
        let err = sign_request(
            &StaticConfig::new(),
            "us-east-1",
            test_endpoint(),
            b"{}".to_vec(),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, InvokeError::MissingConfig(_)));
        assert!(err.to_string().contains("AWS_ACCESS_KEY_ID"));
    }

    #[test]
    fn test_uri_encode_reserved_characters() {
        assert_eq!(uri_encode("meta.llama3-8b-instruct-v1:0"), "meta.llama3-8b-instruct-v1%3A0");
        assert_eq!(uri_encode("a b/c"), "a%20b%2Fc");
        assert_eq!(uri_encode("unreserved-._~09AZaz"), "unreserved-._~09AZaz");
    }
}
