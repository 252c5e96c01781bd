// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Invocation Routing Service
//
// Dispatches each request to exactly one invocation path and hands the
// verdict to the event sink. Sink failures are logged and never fail the
// request — the verdict is the deliverable.

use crate::domain::chat::{ChatMode, ChatRequest, ChatVerdict, InvokeError};
use crate::domain::events::{EventSink, InvocationEvent};
use crate::domain::invoker::ModelInvoker;
use crate::infrastructure::config::ConfigProvider;
use crate::infrastructure::invoke::direct::DirectInvoker;
use crate::infrastructure::invoke::gateway::GatewayInvoker;
use std::sync::Arc;
use tracing::warn;

pub struct InvocationRouter {
    direct: Arc<dyn ModelInvoker>,
    gateway: Arc<dyn ModelInvoker>,
    events: Arc<dyn EventSink>,
}

impl InvocationRouter {
    /// Build the standard pipeline over a configuration provider.
    pub fn new(config: Arc<dyn ConfigProvider>, events: Arc<dyn EventSink>) -> Self {
        Self {
            direct: Arc::new(DirectInvoker::new(config.clone())),
            gateway: Arc::new(GatewayInvoker::new(config)),
            events,
        }
    }

    /// Assemble from explicit invokers (test seam).
    pub fn with_invokers(
        direct: Arc<dyn ModelInvoker>,
        gateway: Arc<dyn ModelInvoker>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            direct,
            gateway,
            events,
        }
    }

    /// Route one request through its selected path and record the outcome.
    pub async fn route(&self, request: &ChatRequest) -> Result<ChatVerdict, InvokeError> {
        let verdict = match request.mode {
            ChatMode::Direct => self.direct.invoke(request).await?,
            ChatMode::Gateway => self.gateway.invoke(request).await?,
        };

        let event = InvocationEvent::from_verdict(
            &verdict,
            request.guardrail_identifier.as_deref(),
            request.guardrail_version.as_deref(),
        );
        if let Err(e) = self.events.record(&event) {
            warn!("Failed to record invocation event: {e:#}");
        }

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::BlockedBy;
    use crate::infrastructure::event_log::MemoryEventSink;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingInvoker {
        calls: AtomicUsize,
        verdict_mode: ChatMode,
    }

    impl CountingInvoker {
        fn new(verdict_mode: ChatMode) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                verdict_mode,
            }
        }
    }

    #[async_trait]
    impl ModelInvoker for CountingInvoker {
        async fn invoke(&self, request: &ChatRequest) -> Result<ChatVerdict, InvokeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ChatVerdict::passed("ok", self.verdict_mode, &request.model_id, 1.0))
        }
    }

    #[tokio::test]
    async fn test_exactly_one_path_executes_per_request() {
        let direct = Arc::new(CountingInvoker::new(ChatMode::Direct));
        let gateway = Arc::new(CountingInvoker::new(ChatMode::Gateway));
        let events = Arc::new(MemoryEventSink::new());
        let router = InvocationRouter::with_invokers(
            direct.clone(),
            gateway.clone(),
            events.clone(),
        );

        let request = ChatRequest::new("hi", ChatMode::Direct, "m");
        router.route(&request).await.unwrap();

        assert_eq!(direct.calls.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert_eq!(events.events().len(), 1);
        assert_eq!(events.events()[0].mode, "direct");
        assert_eq!(events.events()[0].blocked_by, BlockedBy::None);
    }

    #[tokio::test]
    async fn test_event_carries_request_guardrail_fields() {
        let direct = Arc::new(CountingInvoker::new(ChatMode::Direct));
        let gateway = Arc::new(CountingInvoker::new(ChatMode::Gateway));
        let events = Arc::new(MemoryEventSink::new());
        let router = InvocationRouter::with_invokers(direct, gateway.clone(), events.clone());

        let request =
            ChatRequest::new("hi", ChatMode::Gateway, "m").with_guardrail("gr-7", "3");
        router.route(&request).await.unwrap();

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        let event = &events.events()[0];
        assert_eq!(event.guardrail_identifier.as_deref(), Some("gr-7"));
        assert_eq!(event.guardrail_version.as_deref(), Some("3"));
    }
}
