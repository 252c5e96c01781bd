// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Demo command
//!
//! Fires the built-in demo prompts at a running relay and prints a verdict
//! line per prompt. Each prompt exercises a different guardrail layer, so a
//! full run shows pass, first-layer block, and second-layer block outcomes
//! side by side.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::{json, Value};

use aegis_gatekeeper_core::presentation::api::{DemoPrompt, DEMO_PROMPTS};

pub async fn handle_command(base_url: &str, mode: &str) -> Result<()> {
    let modes: Vec<&str> = match mode {
        "direct" => vec!["direct"],
        "gateway" => vec!["gateway"],
        "both" => vec!["direct", "gateway"],
        other => bail!("unknown demo mode: {other} (expected direct, gateway, or both)"),
    };

    let client = reqwest::Client::new();
    let chat_url = format!("{}/chat", base_url.trim_end_matches('/'));

    for mode in modes {
        println!("\n{} {}", "Mode:".bold(), mode.cyan().bold());
        for prompt in &DEMO_PROMPTS {
            run_prompt(&client, &chat_url, mode, prompt).await?;
        }
    }

    Ok(())
}

async fn run_prompt(
    client: &reqwest::Client,
    chat_url: &str,
    mode: &str,
    prompt: &DemoPrompt,
) -> Result<()> {
    println!("  {} {}", prompt.name.bold(), format!("({})", prompt.description).dimmed());

    let response = client
        .post(chat_url)
        .json(&json!({ "message": prompt.message, "mode": mode }))
        .send()
        .await
        .with_context(|| format!("sending demo prompt {} to {chat_url}", prompt.name))?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("decoding relay response for {}", prompt.name))?;

    if !status.is_success() {
        let error = body["error"].as_str().unwrap_or("unknown error");
        println!("    {} {error}", "RELAY ERROR".red().bold());
        return Ok(());
    }

    let blocked = body["blocked"].as_bool().unwrap_or(false);
    let latency = body["total_latency_ms"].as_f64().unwrap_or(0.0);
    if blocked {
        let blocked_by = body["blocked_by"].as_str().unwrap_or("unknown");
        println!(
            "    {} by {} ({latency:.0}ms)",
            "BLOCKED".red().bold(),
            blocked_by.yellow()
        );
    } else {
        let text = body["response"].as_str().unwrap_or("");
        let preview: String = text.chars().take(80).collect();
        println!("    {} {preview} ({latency:.0}ms)", "PASSED".green().bold());
    }

    if let Some(trace) = body["trace_id"].as_str() {
        println!("    {} {trace}", "trace:".dimmed());
    }

    Ok(())
}
