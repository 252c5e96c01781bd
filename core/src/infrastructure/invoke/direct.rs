// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Direct Invoker Adapter
//
// Sends the signed InvokeModel request straight to the model endpoint and
// classifies the raw response. Single attempt, uniform timeout, no retry.

use crate::domain::chat::{ChatRequest, ChatVerdict, InvokeError};
use crate::domain::invoker::ModelInvoker;
use crate::infrastructure::auth;
use crate::infrastructure::config::{keys, ConfigProvider, DEFAULT_REGION};
use crate::infrastructure::invoke::classify::{classify_direct, ResponseParts};
use crate::infrastructure::invoke::post_material;
use crate::infrastructure::payload::build_payload;
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub struct DirectInvoker {
    client: reqwest::Client,
    config: Arc<dyn ConfigProvider>,
}

impl DirectInvoker {
    pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ModelInvoker for DirectInvoker {
    async fn invoke(&self, request: &ChatRequest) -> Result<ChatVerdict, InvokeError> {
        let region = self.config.get_or(keys::AWS_REGION, DEFAULT_REGION);

        // Serialize exactly once: the signature binds these bytes and the
        // same bytes go on the wire.
        let payload = build_payload(&request.message);
        let body = serde_json::to_vec(&payload).map_err(|e| InvokeError::Internal(e.to_string()))?;

        let material = auth::materialize(
            self.config.as_ref(),
            &region,
            &request.model_id,
            body,
            request.guardrail_identifier.as_deref(),
            request.guardrail_version.as_deref(),
        )?;

        counter!("gatekeeper_invocations_total", "mode" => "direct").increment(1);

        let start = Instant::now();
        let sent = post_material(&self.client, &material.url, &material.headers, &material)
            .send()
            .await;

        let verdict = match sent {
            Err(e) => {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                info!("Bedrock direct request failed: {e} latency={elapsed_ms:.1}ms");
                ChatVerdict::transport_error(
                    format!("[ERROR] Bedrock request failed: {e}"),
                    request.mode,
                    &request.model_id,
                    elapsed_ms,
                )
            }
            Ok(response) => {
                let parts = ResponseParts::capture(response).await;
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                info!(
                    "Bedrock direct response: status={} latency={elapsed_ms:.1}ms",
                    parts.status
                );

                let classification = classify_direct(&parts);
                if classification.blocked {
                    counter!("gatekeeper_blocked_total", "mode" => "direct").increment(1);
                }
                classification.into_verdict(request.mode, &request.model_id, elapsed_ms)
            }
        };

        Ok(verdict)
    }
}
