// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Response Classification
//
// Pure functions from a captured (status, headers, body) triple to a
// verdict fragment. Both invokers funnel through here so the precedence
// rules live in exactly one place per path, and classifying the same triple
// twice yields identical results.
//
// Gateway precedence is load-bearing: a gateway-level block reported via
// headers wins over any status-code rule, including HTTP 400 — the gateway
// can reject a request its upstream call never completed.

use crate::domain::chat::BlockedBy;

const HEADER_GUARDRAIL_ACTION: &str = "x-amzn-bedrock-guardrail-action";
const GUARDRAIL_INTERVENED: &str = "INTERVENED";

pub const HEADER_GATEWAY_STATUS: &str = "X-ACVPS-Status";
pub const HEADER_GATEWAY_TRACE_ID: &str = "X-ACVPS-Trace-ID";
pub const HEADER_GATEWAY_VALIDATION_MS: &str = "X-ACVPS-Validation-Ms";

/// Gateway status labels that mean the gateway itself rejected the request.
const GATEWAY_BLOCK_LABELS: [&str; 3] = ["BLOCKED", "REJECTED", "DENIED"];

/// A captured HTTP response, detached from the transport so classification
/// stays pure and replayable.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseParts {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ResponseParts {
    /// Drain a reqwest response into parts. Header values that are not valid
    /// UTF-8 are dropped; a body read failure degrades to an empty body.
    pub async fn capture(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.unwrap_or_default();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Verdict fragment produced by classification; the invoker attaches mode,
/// model and latency.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub response: String,
    pub blocked: bool,
    pub blocked_by: BlockedBy,
}

impl Classification {
    fn passed(response: String) -> Self {
        Self {
            response,
            blocked: false,
            blocked_by: BlockedBy::None,
        }
    }

    fn blocked(response: String, blocked_by: BlockedBy) -> Self {
        Self {
            response,
            blocked: true,
            blocked_by,
        }
    }

    fn transport_error(diagnostic: String) -> Self {
        Self {
            response: diagnostic,
            blocked: false,
            blocked_by: BlockedBy::None,
        }
    }

    /// Lift the fragment into a full verdict. Non-blocked fragments cover
    /// both the passed and transport-error outcomes; the diagnostic text
    /// already distinguishes them.
    pub fn into_verdict(
        self,
        mode: crate::domain::chat::ChatMode,
        model: &str,
        total_latency_ms: f64,
    ) -> crate::domain::chat::ChatVerdict {
        if self.blocked {
            crate::domain::chat::ChatVerdict::blocked(
                self.response,
                mode,
                model,
                self.blocked_by,
                total_latency_ms,
            )
        } else {
            crate::domain::chat::ChatVerdict::passed(self.response, mode, model, total_latency_ms)
        }
    }
}

/// Gateway-reported signals, captured on every branch including blocks and
/// transport errors.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySignals {
    pub trace_id: Option<String>,
    pub status: Option<String>,
    pub validation_ms: Option<f64>,
}

impl GatewaySignals {
    pub fn from_parts(parts: &ResponseParts) -> Self {
        Self {
            trace_id: parts.header(HEADER_GATEWAY_TRACE_ID).map(str::to_string),
            status: parts.header(HEADER_GATEWAY_STATUS).map(str::to_string),
            validation_ms: parts
                .header(HEADER_GATEWAY_VALIDATION_MS)
                .and_then(|v| v.parse::<f64>().ok()),
        }
    }
}

/// Classify a direct model-endpoint response.
pub fn classify_direct(parts: &ResponseParts) -> Classification {
    // Guardrail rejection before the model ran.
    if parts.status == 400 {
        let message = message_field(&parts.body);
        return Classification::blocked(
            format!("[BLOCKED by Bedrock Guardrail] {message}"),
            BlockedBy::BedrockGuardrail,
        );
    }

    if parts.status != 200 {
        return Classification::transport_error(format!(
            "[ERROR] Bedrock returned {}: {}",
            parts.status, parts.body
        ));
    }

    let generation = generation_field(&parts.body);
    if guardrail_intervened(parts) {
        return Classification::blocked(
            format!("[BLOCKED by Bedrock Guardrail] {generation}"),
            BlockedBy::BedrockGuardrail,
        );
    }

    Classification::passed(generation)
}

/// Classify a gateway response. First match wins, in this order: gateway
/// block header, forwarded guardrail 400, unexpected status, 200 body.
pub fn classify_gateway(parts: &ResponseParts) -> (Classification, GatewaySignals) {
    let signals = GatewaySignals::from_parts(parts);

    if let Some(label) = signals.status.as_deref() {
        if GATEWAY_BLOCK_LABELS
            .iter()
            .any(|blocked| label.eq_ignore_ascii_case(blocked))
        {
            let message = error_or_message_field(&parts.body);
            return (
                Classification::blocked(
                    format!("[BLOCKED by Gateway] {message}"),
                    BlockedBy::Gateway,
                ),
                signals,
            );
        }
    }

    if parts.status == 400 {
        let message = message_field(&parts.body);
        return (
            Classification::blocked(
                format!("[BLOCKED by Bedrock Guardrail] {message}"),
                BlockedBy::BedrockGuardrail,
            ),
            signals,
        );
    }

    if parts.status != 200 {
        return (
            Classification::transport_error(format!(
                "[ERROR] Gateway returned {}: {}",
                parts.status, parts.body
            )),
            signals,
        );
    }

    let generation = generation_field(&parts.body);
    if guardrail_intervened(parts) {
        return (
            Classification::blocked(
                format!("[BLOCKED by Bedrock Guardrail] {generation}"),
                BlockedBy::BedrockGuardrail,
            ),
            signals,
        );
    }

    (Classification::passed(generation), signals)
}

fn guardrail_intervened(parts: &ResponseParts) -> bool {
    parts.header(HEADER_GUARDRAIL_ACTION) == Some(GUARDRAIL_INTERVENED)
}

/// `message` field of a JSON error body; raw text when parsing fails.
fn message_field(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Gateway error bodies prefer `error`, then `message`, then raw text.
fn error_or_message_field(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.as_str())
                .or_else(|| v.get("message").and_then(|m| m.as_str()))
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// `generation` field of a 200 body, defaulting to empty text.
fn generation_field(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("generation")
                .and_then(|g| g.as_str())
                .map(str::to_string)
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(status: u16, headers: &[(&str, &str)], body: &str) -> ResponseParts {
        ResponseParts {
            status,
            headers: headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_direct_200_without_intervention_passes() {
        let c = classify_direct(&parts(200, &[], r#"{"generation":"Neural networks..."}"#));
        assert!(!c.blocked);
        assert_eq!(c.blocked_by, BlockedBy::None);
        assert_eq!(c.response, "Neural networks...");
    }

    #[test]
    fn test_direct_400_is_guardrail_block_with_message() {
        let c = classify_direct(&parts(400, &[], r#"{"message":"violates usage policy"}"#));
        assert!(c.blocked);
        assert_eq!(c.blocked_by, BlockedBy::BedrockGuardrail);
        assert!(c.response.contains("violates usage policy"));
    }

    #[test]
    fn test_direct_400_malformed_json_degrades_to_raw_body() {
        let c = classify_direct(&parts(400, &[], "not json at all"));
        assert!(c.blocked);
        assert!(c.response.contains("not json at all"));
    }

    #[test]
    fn test_direct_unexpected_status_is_transport_error() {
        let c = classify_direct(&parts(503, &[], "service unavailable"));
        assert!(!c.blocked);
        assert_eq!(c.blocked_by, BlockedBy::None);
        assert!(c.response.contains("503"));
        assert!(c.response.contains("service unavailable"));
    }

    #[test]
    fn test_direct_intervention_header_blocks_despite_200() {
        let c = classify_direct(&parts(
            200,
            &[("X-Amzn-Bedrock-Guardrail-Action", "INTERVENED")],
            r#"{"generation":"partial text"}"#,
        ));
        assert!(c.blocked);
        assert_eq!(c.blocked_by, BlockedBy::BedrockGuardrail);
        assert!(c.response.contains("partial text"));
    }

    #[test]
    fn test_direct_intervention_header_value_is_exact() {
        let c = classify_direct(&parts(
            200,
            &[("x-amzn-bedrock-guardrail-action", "NONE")],
            r#"{"generation":"ok"}"#,
        ));
        assert!(!c.blocked);
    }

    #[test]
    fn test_direct_200_missing_generation_defaults_empty() {
        let c = classify_direct(&parts(200, &[], "{}"));
        assert!(!c.blocked);
        assert_eq!(c.response, "");
    }

    #[test]
    fn test_gateway_block_header_wins_over_http_400() {
        // Precedence: a gateway-level block must never be attributed to the
        // first-layer guardrail, even when the status code alone says 400.
        let (c, signals) = classify_gateway(&parts(
            400,
            &[("X-ACVPS-Status", "BLOCKED"), ("X-ACVPS-Trace-ID", "t-1")],
            r#"{"error":"prompt injection detected"}"#,
        ));
        assert!(c.blocked);
        assert_eq!(c.blocked_by, BlockedBy::Gateway);
        assert!(c.response.contains("prompt injection detected"));
        assert_eq!(signals.trace_id.as_deref(), Some("t-1"));
    }

    #[test]
    fn test_gateway_block_header_wins_over_http_200() {
        let (c, _) = classify_gateway(&parts(
            200,
            &[("x-acvps-status", "blocked")],
            r#"{"error":"prompt injection detected"}"#,
        ));
        assert!(c.blocked);
        assert_eq!(c.blocked_by, BlockedBy::Gateway);
    }

    #[test]
    fn test_gateway_block_label_variants() {
        for label in ["REJECTED", "DENIED", "Rejected"] {
            let (c, _) = classify_gateway(&parts(200, &[("X-ACVPS-Status", label)], "{}"));
            assert!(c.blocked, "label {label} should block");
            assert_eq!(c.blocked_by, BlockedBy::Gateway);
        }
        // A pass-through status label does not block.
        let (c, signals) = classify_gateway(&parts(
            200,
            &[("X-ACVPS-Status", "VALIDATED")],
            r#"{"generation":"ok"}"#,
        ));
        assert!(!c.blocked);
        assert_eq!(signals.status.as_deref(), Some("VALIDATED"));
    }

    #[test]
    fn test_gateway_error_body_falls_back_error_then_message_then_raw() {
        let (c, _) = classify_gateway(&parts(
            200,
            &[("X-ACVPS-Status", "BLOCKED")],
            r#"{"message":"only message"}"#,
        ));
        assert!(c.response.contains("only message"));

        let (c, _) = classify_gateway(&parts(200, &[("X-ACVPS-Status", "BLOCKED")], "plain text"));
        assert!(c.response.contains("plain text"));
    }

    #[test]
    fn test_gateway_forwarded_400_is_first_layer_block() {
        let (c, _) = classify_gateway(&parts(400, &[], r#"{"message":"violates usage policy"}"#));
        assert!(c.blocked);
        assert_eq!(c.blocked_by, BlockedBy::BedrockGuardrail);
    }

    #[test]
    fn test_gateway_unexpected_status_keeps_signals() {
        let (c, signals) = classify_gateway(&parts(
            502,
            &[
                ("X-ACVPS-Trace-ID", "t-2"),
                ("X-ACVPS-Validation-Ms", "3.5"),
            ],
            "bad gateway",
        ));
        assert!(!c.blocked);
        assert!(c.response.contains("502"));
        assert_eq!(signals.trace_id.as_deref(), Some("t-2"));
        assert_eq!(signals.validation_ms, Some(3.5));
    }

    #[test]
    fn test_gateway_unparsable_validation_ms_is_absent() {
        let (_, signals) = classify_gateway(&parts(
            200,
            &[("X-ACVPS-Validation-Ms", "fast")],
            r#"{"generation":"ok"}"#,
        ));
        assert_eq!(signals.validation_ms, None);
    }

    #[test]
    fn test_gateway_intervention_header_on_200_is_first_layer_block() {
        let (c, _) = classify_gateway(&parts(
            200,
            &[("x-amzn-bedrock-guardrail-action", "INTERVENED")],
            r#"{"generation":"partial"}"#,
        ));
        assert!(c.blocked);
        assert_eq!(c.blocked_by, BlockedBy::BedrockGuardrail);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let p = parts(
            400,
            &[("X-ACVPS-Status", "BLOCKED")],
            r#"{"error":"nope"}"#,
        );
        assert_eq!(classify_gateway(&p), classify_gateway(&p));

        let d = parts(200, &[], r#"{"generation":"same"}"#);
        assert_eq!(classify_direct(&d), classify_direct(&d));
    }
}
