// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Serve command
//!
//! Binds the relay's HTTP surface over the process environment: env-backed
//! configuration, JSONL event log, one invocation router shared by all
//! requests.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use aegis_gatekeeper_core::application::InvocationRouter;
use aegis_gatekeeper_core::infrastructure::config::{
    keys, ConfigProvider, EnvConfig, DEFAULT_EVENTS_LOG_PATH,
};
use aegis_gatekeeper_core::infrastructure::event_log::JsonlEventSink;
use aegis_gatekeeper_core::presentation::api;

pub async fn handle_command(host: &str, port: u16) -> Result<()> {
    let config = Arc::new(EnvConfig);
    let log_path = config.get_or(keys::EVENTS_LOG_PATH, DEFAULT_EVENTS_LOG_PATH);
    let events = Arc::new(JsonlEventSink::new(&log_path));
    let router = Arc::new(InvocationRouter::new(config, events));

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Gatekeeper relay listening on http://{addr} (events -> {log_path})");

    axum::serve(listener, api::app(router))
        .await
        .context("relay server terminated")
}
