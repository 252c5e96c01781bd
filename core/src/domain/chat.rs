// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Chat Routing Domain Types
//
// Defines the request/verdict vocabulary shared by both invocation paths.
// The verdict constructors are the only way to produce a ChatVerdict, which
// keeps the blocked/attribution invariant in one place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Routing mode for a chat request: straight to the model endpoint, or
/// relayed through the validation gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Direct,
    Gateway,
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMode::Direct => write!(f, "direct"),
            ChatMode::Gateway => write!(f, "gateway"),
        }
    }
}

impl FromStr for ChatMode {
    type Err = InvokeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(ChatMode::Direct),
            "gateway" => Ok(ChatMode::Gateway),
            other => Err(InvokeError::UnknownMode(other.to_string())),
        }
    }
}

/// One inbound chat request. Immutable once constructed; consumed by exactly
/// one invoker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub mode: ChatMode,
    pub model_id: String,
    pub guardrail_identifier: Option<String>,
    pub guardrail_version: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, mode: ChatMode, model_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mode,
            model_id: model_id.into(),
            guardrail_identifier: None,
            guardrail_version: None,
        }
    }

    pub fn with_guardrail(
        mut self,
        identifier: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.guardrail_identifier = Some(identifier.into());
        self.guardrail_version = Some(version.into());
        self
    }
}

/// Which subsystem blocked the request, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockedBy {
    None,
    BedrockGuardrail,
    Gateway,
}

/// The single classified outcome of one invocation attempt.
///
/// Invariant: `blocked == (blocked_by != BlockedBy::None)`. Enforced by the
/// constructors; there is no other way to set the pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatVerdict {
    pub response: String,
    pub mode: ChatMode,
    pub model: String,
    pub blocked: bool,
    pub blocked_by: BlockedBy,
    pub trace_id: Option<String>,
    pub gateway_status: Option<String>,
    pub validation_ms: Option<f64>,
    pub total_latency_ms: f64,
}

impl ChatVerdict {
    /// Request passed every guardrail layer.
    pub fn passed(
        response: impl Into<String>,
        mode: ChatMode,
        model: impl Into<String>,
        total_latency_ms: f64,
    ) -> Self {
        Self {
            response: response.into(),
            mode,
            model: model.into(),
            blocked: false,
            blocked_by: BlockedBy::None,
            trace_id: None,
            gateway_status: None,
            validation_ms: None,
            total_latency_ms,
        }
    }

    /// Request blocked by a guardrail layer. `blocked_by` must name the
    /// layer; `BlockedBy::None` here is a logic error.
    pub fn blocked(
        response: impl Into<String>,
        mode: ChatMode,
        model: impl Into<String>,
        blocked_by: BlockedBy,
        total_latency_ms: f64,
    ) -> Self {
        debug_assert!(blocked_by != BlockedBy::None, "blocked verdict needs an attribution");
        Self {
            response: response.into(),
            mode,
            model: model.into(),
            blocked: true,
            blocked_by,
            trace_id: None,
            gateway_status: None,
            validation_ms: None,
            total_latency_ms,
        }
    }

    /// Transport-level failure (connection error, timeout, unexpected
    /// status). Not a block: the diagnostic rides in the response text.
    pub fn transport_error(
        diagnostic: impl Into<String>,
        mode: ChatMode,
        model: impl Into<String>,
        total_latency_ms: f64,
    ) -> Self {
        Self {
            response: diagnostic.into(),
            mode,
            model: model.into(),
            blocked: false,
            blocked_by: BlockedBy::None,
            trace_id: None,
            gateway_status: None,
            validation_ms: None,
            total_latency_ms,
        }
    }

    /// Attach gateway-reported signals. Captured on every gateway branch,
    /// including blocked and transport-error outcomes.
    pub fn with_gateway_signals(
        mut self,
        trace_id: Option<String>,
        gateway_status: Option<String>,
        validation_ms: Option<f64>,
    ) -> Self {
        self.trace_id = trace_id;
        self.gateway_status = gateway_status;
        self.validation_ms = validation_ms;
        self
    }
}

/// Errors that can occur before or instead of an invocation verdict.
///
/// Transport failures and guardrail blocks are *not* errors: they are
/// classified into verdicts. Only configuration problems and internal
/// failures surface here.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("missing required configuration: {0}")]
    MissingConfig(String),

    #[error("unknown mode: {0}")]
    UnknownMode(String),

    #[error("internal error: {0}")]
    Internal(String),
}
