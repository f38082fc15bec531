// ABOUTME: CLI send and broadcast commands - type text into agent panes

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;

use super::util::{build_manager, resolve_session};
use super::{BroadcastArgs, OutputFormat, SendArgs};
use crate::config::AppConfig;
use crate::models::PaneRole;
use crate::session::BroadcastReport;

/// A broadcast that reached some panes but not all
#[derive(Error, Debug)]
#[error("broadcast to '{session}' failed on {}", .failed.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
pub struct PartialBroadcast {
    pub session: String,
    pub failed: Vec<PaneRole>,
}

/// Execute the send command
pub async fn execute_send(args: SendArgs, config: &AppConfig) -> Result<()> {
    let manager = build_manager(config)?;
    let name = resolve_session(&manager, &args.session)?;

    manager.send(&name, args.role, &args.text).await?;
    println!("Sent to {} {}", name, args.role);
    Ok(())
}

#[derive(Debug, Serialize)]
struct BroadcastOutput<'a> {
    session: &'a str,
    #[serde(flatten)]
    report: &'a BroadcastReport,
}

/// Execute the broadcast command
pub async fn execute_broadcast(
    args: BroadcastArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<()> {
    let manager = build_manager(config)?;
    let name = resolve_session(&manager, &args.session)?;

    let report = manager.broadcast(&name, &args.text).await?;

    match format {
        OutputFormat::Json => {
            let output = BroadcastOutput {
                session: &name,
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            for role in &report.delivered {
                println!("  delivered  {role}");
            }
            for (role, message) in &report.failed {
                eprintln!("  failed     {role}: {message}");
            }
        }
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(PartialBroadcast {
            session: name,
            failed: report.failed_roles(),
        }
        .into())
    }
}
