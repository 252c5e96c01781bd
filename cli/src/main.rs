// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # AEGIS Gatekeeper CLI
//!
//! The `gatekeeper` binary fronts the guarded model invocation relay.
//!
//! ## Commands
//!
//! - `gatekeeper serve` - Run the HTTP relay service
//! - `gatekeeper demo` - Fire the built-in demo prompts at a running relay
//! - `gatekeeper export oscal|stix` - Fetch compliance documents from the portal

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

use commands::export::ExportCommand;

/// AEGIS Gatekeeper - Guarded model invocation relay
#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "GATEKEEPER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP relay service
    Serve {
        /// Bind host
        #[arg(long, env = "GATEKEEPER_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Bind port
        #[arg(long, env = "GATEKEEPER_PORT", default_value = "8000")]
        port: u16,
    },

    /// Run the built-in demo prompts against a relay instance
    Demo {
        /// Base URL of the running relay
        #[arg(long, default_value = "http://localhost:8000")]
        base_url: String,

        /// Invocation mode: direct, gateway, or both
        #[arg(long, default_value = "both")]
        mode: String,
    },

    /// Fetch compliance exports from the vendor portal
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => commands::serve::handle_command(&host, port).await,
        Some(Commands::Demo { base_url, mode }) => {
            commands::demo::handle_command(&base_url, &mode).await
        }
        Some(Commands::Export { command }) => commands::export::handle_command(command).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
