// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gateway Invoker Adapter
//
// Relays the signed InvokeModel request through the validation gateway's
// /api/proxy sub-path. The gateway receives its identity headers, the
// model-endpoint URL as a routing hint, and a fixed allowlisted subset of
// the auth headers. The hint is a trust assumption: the core re-derives the
// model URL and cannot detect a gateway whose actual outbound target drifts
// from it.

use crate::domain::chat::{ChatRequest, ChatVerdict, InvokeError};
use crate::domain::invoker::ModelInvoker;
use crate::infrastructure::auth;
use crate::infrastructure::config::{keys, ConfigProvider, DEFAULT_GATEWAY_URL, DEFAULT_REGION};
use crate::infrastructure::invoke::classify::{classify_gateway, ResponseParts};
use crate::infrastructure::invoke::post_material;
use crate::infrastructure::payload::build_payload;
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub const HEADER_API_KEY: &str = "X-API-Key";
pub const HEADER_DC_ID: &str = "X-DC-Id";
pub const HEADER_DC_DIGEST: &str = "X-DC-Digest";
pub const HEADER_DC_SUITE: &str = "X-DC-Suite";
pub const HEADER_TARGET_ENDPOINT: &str = "X-Target-Endpoint";
pub const HEADER_TENANT_ID: &str = "X-Tenant-ID";

pub const DEFAULT_DC_SUITE: &str = "bedrock-guardrail-complement";
pub const DEFAULT_TENANT_ID: &str = "default";

/// Auth headers forwarded from the materialized request into the gateway
/// header set. Declared as data so the allowlist is testable on its own;
/// only headers actually present are forwarded.
pub const FORWARDED_AUTH_HEADERS: [&str; 6] = [
    "Authorization",
    "X-Amz-Date",
    "X-Amz-Security-Token",
    "X-Amz-Content-Sha256",
    "X-Amzn-Bedrock-GuardrailIdentifier",
    "X-Amzn-Bedrock-GuardrailVersion",
];

pub struct GatewayInvoker {
    client: reqwest::Client,
    config: Arc<dyn ConfigProvider>,
}

impl GatewayInvoker {
    pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn proxy_url(&self) -> String {
        let base = self.config.get_or(keys::GATEWAY_URL, DEFAULT_GATEWAY_URL);
        format!("{}/api/proxy", base.trim_end_matches('/'))
    }
}

#[async_trait]
impl ModelInvoker for GatewayInvoker {
    async fn invoke(&self, request: &ChatRequest) -> Result<ChatVerdict, InvokeError> {
        let region = self.config.get_or(keys::AWS_REGION, DEFAULT_REGION);
        let api_key = self.config.require(keys::GATEWAY_API_KEY)?;
        let dc_id = self.config.require(keys::GATEWAY_DC_ID)?;
        let dc_digest = self.config.get_or(keys::GATEWAY_DC_DIGEST, "");
        let dc_suite = self.config.get_or(keys::GATEWAY_DC_SUITE, DEFAULT_DC_SUITE);
        let tenant_id = self.config.get_or(keys::GATEWAY_TENANT_ID, DEFAULT_TENANT_ID);

        let payload = build_payload(&request.message);
        let body = serde_json::to_vec(&payload).map_err(|e| InvokeError::Internal(e.to_string()))?;

        // Auth material targets the model endpoint; its URL doubles as the
        // routing hint the gateway needs to call Bedrock on our behalf.
        let material = auth::materialize(
            self.config.as_ref(),
            &region,
            &request.model_id,
            body,
            request.guardrail_identifier.as_deref(),
            request.guardrail_version.as_deref(),
        )?;

        let mut headers: Vec<(String, String)> = vec![
            (HEADER_API_KEY.to_string(), api_key),
            (HEADER_DC_ID.to_string(), dc_id),
            (HEADER_DC_DIGEST.to_string(), dc_digest),
            (HEADER_DC_SUITE.to_string(), dc_suite),
            (HEADER_TARGET_ENDPOINT.to_string(), material.url.clone()),
            (HEADER_TENANT_ID.to_string(), tenant_id),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        for name in FORWARDED_AUTH_HEADERS {
            if let Some(value) = material.header(name) {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        counter!("gatekeeper_invocations_total", "mode" => "gateway").increment(1);

        let proxy_url = self.proxy_url();
        let start = Instant::now();
        let sent = post_material(&self.client, &proxy_url, &headers, &material)
            .send()
            .await;

        let verdict = match sent {
            Err(e) => {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                info!("Gateway request failed: {e} latency={elapsed_ms:.1}ms");
                ChatVerdict::transport_error(
                    format!("[ERROR] Gateway request failed: {e}"),
                    request.mode,
                    &request.model_id,
                    elapsed_ms,
                )
            }
            Ok(response) => {
                let parts = ResponseParts::capture(response).await;
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

                let (classification, signals) = classify_gateway(&parts);
                info!(
                    "Gateway response: status={} gateway_status={:?} trace={:?} latency={elapsed_ms:.1}ms",
                    parts.status, signals.status, signals.trace_id
                );

                if classification.blocked {
                    counter!("gatekeeper_blocked_total", "mode" => "gateway").increment(1);
                }
                classification
                    .into_verdict(request.mode, &request.model_id, elapsed_ms)
                    .with_gateway_signals(signals.trace_id, signals.status, signals.validation_ms)
            }
        };

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::StaticConfig;

    #[test]
    fn test_forwarded_header_allowlist_contents() {
        assert_eq!(
            FORWARDED_AUTH_HEADERS,
            [
                "Authorization",
                "X-Amz-Date",
                "X-Amz-Security-Token",
                "X-Amz-Content-Sha256",
                "X-Amzn-Bedrock-GuardrailIdentifier",
                "X-Amzn-Bedrock-GuardrailVersion",
            ]
        );
    }

    #[test]
    fn test_proxy_url_normalizes_trailing_slash() {
        let invoker = GatewayInvoker::new(Arc::new(
            StaticConfig::new().set(keys::GATEWAY_URL, "http://127.0.0.1:9999/"),
        ));
        assert_eq!(invoker.proxy_url(), "http://127.0.0.1:9999/api/proxy");
    }

    #[test]
    fn test_proxy_url_defaults_to_vendor_gateway() {
        let invoker = GatewayInvoker::new(Arc::new(StaticConfig::new()));
        assert_eq!(invoker.proxy_url(), "https://gateway.ethicalzen.ai/api/proxy");
    }
}
