// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Invocation Event Domain Types
//
// One self-contained record per invocation, appended by an EventSink with no
// cross-call ordering requirement. The timestamp is attached at log time,
// not at invocation time.

use crate::domain::chat::{BlockedBy, ChatVerdict};
use serde::{Deserialize, Serialize};

/// Structured event derived from a verdict, serialized as one JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationEvent {
    pub trace_id: Option<String>,
    pub mode: String,
    pub model: String,
    pub guardrail_identifier: Option<String>,
    pub guardrail_version: Option<String>,
    pub gateway_status: Option<String>,
    pub blocked: bool,
    pub blocked_by: BlockedBy,
    pub validation_ms: Option<f64>,
    pub total_latency_ms: f64,
    pub timestamp: String,
}

impl InvocationEvent {
    pub fn from_verdict(
        verdict: &ChatVerdict,
        guardrail_identifier: Option<&str>,
        guardrail_version: Option<&str>,
    ) -> Self {
        Self {
            trace_id: verdict.trace_id.clone(),
            mode: verdict.mode.to_string(),
            model: verdict.model.clone(),
            guardrail_identifier: guardrail_identifier.map(str::to_string),
            guardrail_version: guardrail_version.map(str::to_string),
            gateway_status: verdict.gateway_status.clone(),
            blocked: verdict.blocked,
            blocked_by: verdict.blocked_by,
            validation_ms: verdict.validation_ms,
            total_latency_ms: verdict.total_latency_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Append-only sink for invocation events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &InvocationEvent) -> anyhow::Result<()>;
}
