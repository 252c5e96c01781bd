// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Export command
//!
//! Fetches pre-aggregated compliance documents (OSCAL Assessment Results or
//! STIX bundles) from the vendor portal and writes them to stdout or a file.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::Value;
use std::path::PathBuf;

use aegis_gatekeeper_core::infrastructure::compliance::ComplianceClient;
use aegis_gatekeeper_core::infrastructure::config::EnvConfig;

#[derive(Subcommand)]
pub enum ExportCommand {
    /// OSCAL 1.1.2 Assessment Results
    Oscal {
        /// Range start (ISO 8601)
        #[arg(long, value_name = "TIME")]
        start: Option<String>,

        /// Range end (ISO 8601)
        #[arg(long, value_name = "TIME")]
        end: Option<String>,

        /// Framework filter (nist_ai_rmf, iso_42001, nist_csf)
        #[arg(long)]
        framework: Option<String>,

        /// Write to file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// STIX 2.1 threat-intelligence bundle
    Stix {
        /// Range start (ISO 8601)
        #[arg(long, value_name = "TIME")]
        start: Option<String>,

        /// Range end (ISO 8601)
        #[arg(long, value_name = "TIME")]
        end: Option<String>,

        /// Write to file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

pub async fn handle_command(command: ExportCommand) -> Result<()> {
    let client = ComplianceClient::from_config(&EnvConfig)?;

    let (document, output) = match command {
        ExportCommand::Oscal {
            start,
            end,
            framework,
            output,
        } => (
            client
                .fetch_oscal(start.as_deref(), end.as_deref(), framework.as_deref())
                .await?,
            output,
        ),
        ExportCommand::Stix { start, end, output } => (
            client.fetch_stix(start.as_deref(), end.as_deref()).await?,
            output,
        ),
    };

    write_document(&document, output)
}

fn write_document(document: &Value, output: Option<PathBuf>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(document).context("rendering export document")?;
    match output {
        Some(path) => {
            std::fs::write(&path, rendered).with_context(|| format!("writing {path:?}"))?;
            eprintln!("{} {}", "Export written to".green(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
