// ABOUTME: Command-line recipe context builder for a single group document
// ABOUTME: Sanitizes the group, aggregates it, and applies output validation before printing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! Usage:
//! ```bash
//! # Anonymized context of a group stored in a file
//! family-serve-context group.json
//!
//! # Read from stdin, mask PII, pretty-print
//! cat group.json | family-serve-context - --mode mask --pretty
//!
//! # Named context (requires ALLOW_RAW_CONTEXT=true)
//! family-serve-context group.json --raw
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use family_serve::config::environment::{OutputValidationMode, ServerConfig};
use family_serve::constants::tools::GROUP_RECIPE_CONTEXT;
use family_serve::logging;
use family_serve::models::{GroupInput, ToolValue};
use family_serve::security::audit::AuditLog;
use family_serve::tools::{parse_group_document, GroupTools, InMemoryGroupDirectory, ToolResult};
use serde_json::{json, Value};
use tokio::fs;
use tokio::io::{self, AsyncReadExt};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "family-serve-context",
    about = "Build the recipe context of a group",
    long_about = "Reads a group JSON document, sanitizes it, aggregates it into a recipe context and prints the validated result."
)]
struct Cli {
    /// Group document path, `-` for stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Keep member names (honored only when ALLOW_RAW_CONTEXT=true)
    #[arg(long)]
    raw: bool,

    /// Output strictness override (`warn`, `mask`, `block`)
    #[arg(long)]
    mode: Option<String>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env();
    if let Some(mode) = cli.mode.as_deref() {
        config.output_validation.mode = OutputValidationMode::parse(mode)
            .ok_or_else(|| anyhow!("Unknown strictness mode: {mode}"))?;
    }
    if cli.raw && !config.allow_raw_context {
        warn!("--raw ignored: raw contexts are not allowed");
    }

    let group = read_group(&cli.input).await?;
    let group_id = group.id.clone();
    info!(group_id = %group_id, members = group.members.len(), "Group loaded");

    let audit_log = match AuditLog::open(&config.audit_log) {
        Ok(log) => Some(log),
        Err(e) => {
            warn!("Output validation audit log disabled: {}", e);
            None
        }
    };
    let tools = GroupTools::from_config(
        InMemoryGroupDirectory::new(vec![group]),
        &config,
        audit_log.as_ref().map(AuditLog::handle),
    );

    let args = ToolValue::from(json!({"id": group_id, "anonymize": !cli.raw}));
    let outcome = tools.call(GROUP_RECIPE_CONTEXT, args).await;

    // Flush flagged-output entries even when the call was blocked
    if let Some(log) = audit_log {
        if let Err(e) = log.close().await {
            warn!("Failed to close audit log: {}", e);
        }
    }

    let result = outcome.context("Failed to build recipe context")?;
    println!("{}", render(&result, cli.pretty)?);
    Ok(())
}

async fn read_group(input: &Path) -> Result<GroupInput> {
    let raw = if input.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .await
            .context("Failed to read group document from stdin")?;
        buffer
    } else {
        fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read group document {}", input.display()))?
    };

    let document: Value = serde_json::from_str(&raw).context("Group document is not valid JSON")?;
    parse_group_document(ToolValue::from(document)).context("Group document rejected")
}

fn render(result: &ToolResult, pretty: bool) -> Result<String> {
    let Some(structured) = &result.structured_content else {
        return Ok(result.first_text().unwrap_or_default().to_owned());
    };
    let rendered = if pretty {
        serde_json::to_string_pretty(structured)?
    } else {
        serde_json::to_string(structured)?
    };
    Ok(rendered)
}
