// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Model Invoker Domain Interface (Anti-Corruption Layer)
//
// One implementation per invocation path (direct, gateway). Keeps the
// classification precedence of each path enforceable in one place instead of
// copy-pasted call sites.
//
// Implementations in infrastructure/invoke/ directory.

use crate::domain::chat::{ChatRequest, ChatVerdict, InvokeError};
use async_trait::async_trait;

/// Domain interface for one invocation path to the model endpoint.
///
/// A call performs exactly one outbound request (no retry) and always
/// classifies the outcome into a [`ChatVerdict`]; only configuration and
/// internal failures surface as errors.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, request: &ChatRequest) -> Result<ChatVerdict, InvokeError>;
}
