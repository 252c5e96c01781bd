// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Compliance Report Client
//
// Fetches pre-aggregated compliance documents from the gateway vendor's
// portal. The portal builds OSCAL 1.1.2 Assessment Results and STIX 2.1
// bundles from the evidence the gateway captures; this client only fetches.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};

use crate::infrastructure::config::{keys, ConfigProvider, DEFAULT_PORTAL_URL};
use crate::infrastructure::invoke::gateway::{HEADER_API_KEY, HEADER_TENANT_ID};

/// Client for the vendor portal's GRC export endpoints.
pub struct ComplianceClient {
    base_url: String,
    api_key: String,
    tenant_id: String,
    client: Client,
}

impl ComplianceClient {
    pub fn from_config(config: &dyn ConfigProvider) -> Result<Self> {
        let api_key = config
            .require(keys::GATEWAY_API_KEY)
            .context("compliance client needs the gateway API key")?;
        Ok(Self {
            base_url: config.get_or(keys::PORTAL_URL, DEFAULT_PORTAL_URL),
            api_key,
            tenant_id: config.get_or(keys::GATEWAY_TENANT_ID, "demo"),
            client: Client::new(),
        })
    }

    /// Fetch OSCAL Assessment Results, optionally filtered by ISO 8601 time
    /// range and framework (`nist_ai_rmf`, `iso_42001`, `nist_csf`).
    pub async fn fetch_oscal(
        &self,
        start_time: Option<&str>,
        end_time: Option<&str>,
        framework: Option<&str>,
    ) -> Result<Value> {
        let mut body = json!({});
        if let Some(start) = start_time {
            body["startTime"] = json!(start);
        }
        if let Some(end) = end_time {
            body["endTime"] = json!(end);
        }
        if let Some(framework) = framework {
            body["framework"] = json!(framework);
        }
        self.export("oscal", body).await
    }

    /// Fetch a STIX 2.1 bundle for the given time range.
    pub async fn fetch_stix(
        &self,
        start_time: Option<&str>,
        end_time: Option<&str>,
    ) -> Result<Value> {
        let mut body = json!({});
        if let Some(start) = start_time {
            body["startTime"] = json!(start);
        }
        if let Some(end) = end_time {
            body["endTime"] = json!(end);
        }
        self.export("stix", body).await
    }

    async fn export(&self, kind: &str, body: Value) -> Result<Value> {
        let url = format!(
            "{}/api/v2/grc/export/{kind}",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header(HEADER_API_KEY, &self.api_key)
            .header(HEADER_TENANT_ID, &self.tenant_id)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .with_context(|| format!("requesting {kind} export"))?;

        response
            .json()
            .await
            .with_context(|| format!("decoding {kind} export response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::StaticConfig;

    #[test]
    fn test_client_requires_api_key() {
        assert!(ComplianceClient::from_config(&StaticConfig::new()).is_err());
    }

    #[tokio::test]
    async fn test_oscal_export_request_shape() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/grc/export/oscal")
            .match_header("x-api-key", "portal-key")
            .match_header("x-tenant-id", "tenant-7")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "startTime": "2026-01-01T00:00:00Z",
                "framework": "nist_ai_rmf",
            })))
            .with_status(200)
            .with_body(r#"{"eventCount": 3, "document": {}}"#)
            .create_async()
            .await;

        let config = StaticConfig::new()
            .set(keys::GATEWAY_API_KEY, "portal-key")
            .set(keys::GATEWAY_TENANT_ID, "tenant-7")
            .set(keys::PORTAL_URL, server.url());
        let client = ComplianceClient::from_config(&config).unwrap();

        let result = client
            .fetch_oscal(Some("2026-01-01T00:00:00Z"), None, Some("nist_ai_rmf"))
            .await
            .unwrap();
        assert_eq!(result["eventCount"], 3);
        mock.assert_async().await;
    }
}
