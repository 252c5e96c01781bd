// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Configuration Provider
//
// All secrets and endpoints come in through this seam so invokers and the
// credential selector never read process state directly; tests substitute a
// map-backed provider.

use crate::domain::chat::InvokeError;
use std::collections::HashMap;

/// Configuration keys consumed by the core.
pub mod keys {
    pub const AWS_REGION: &str = "AWS_REGION";
    pub const AWS_BEARER_TOKEN_BEDROCK: &str = "AWS_BEARER_TOKEN_BEDROCK";
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
    pub const BEDROCK_ENDPOINT: &str = "BEDROCK_ENDPOINT";
    pub const GATEWAY_URL: &str = "GATEWAY_URL";
    pub const GATEWAY_API_KEY: &str = "GATEWAY_API_KEY";
    pub const GATEWAY_DC_ID: &str = "GATEWAY_DC_ID";
    pub const GATEWAY_DC_DIGEST: &str = "GATEWAY_DC_DIGEST";
    pub const GATEWAY_DC_SUITE: &str = "GATEWAY_DC_SUITE";
    pub const GATEWAY_TENANT_ID: &str = "GATEWAY_TENANT_ID";
    pub const PORTAL_URL: &str = "PORTAL_URL";
    pub const EVENTS_LOG_PATH: &str = "EVENTS_LOG_PATH";
}

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.ethicalzen.ai";
pub const DEFAULT_PORTAL_URL: &str = "https://api.ethicalzen.ai";
pub const DEFAULT_EVENTS_LOG_PATH: &str = "logs/events.jsonl";

/// Read-only view over configured values. Empty values count as absent.
pub trait ConfigProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Fetch a value that must be present, failing with the configuration
    /// error the caller surfaces as fatal.
    fn require(&self, key: &str) -> Result<String, InvokeError> {
        self.get(key)
            .ok_or_else(|| InvokeError::MissingConfig(format!("{key} is not set")))
    }
}

/// Process-environment backed provider used by the service and CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl ConfigProvider for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Fixed-map provider for tests and embedded setups.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    values: HashMap<String, String>,
}

impl StaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigProvider for StaticConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_config_lookup_and_default() {
        let cfg = StaticConfig::new().set("A", "1").set("EMPTY", "");
        assert_eq!(cfg.get("A").as_deref(), Some("1"));
        assert_eq!(cfg.get("EMPTY"), None);
        assert_eq!(cfg.get_or("MISSING", "fallback"), "fallback");
    }

    #[test]
    fn test_require_missing_is_configuration_error() {
        let cfg = StaticConfig::new();
        let err = cfg.require(keys::GATEWAY_API_KEY).unwrap_err();
        assert!(matches!(err, InvokeError::MissingConfig(_)));
        assert!(err.to_string().contains("GATEWAY_API_KEY"));
    }
}
