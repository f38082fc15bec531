// ABOUTME: CLI spawn command - create a session of agents and attach to it

use anyhow::{Context, Result};
use std::path::PathBuf;

use super::util::{build_manager, with_editor};
use super::{OutputFormat, SpawnArgs};
use crate::config::AppConfig;
use crate::models::AgentSession;

/// Execute the spawn command
pub async fn execute(args: SpawnArgs, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let repo = resolve_repo_path(args.repo)?;
    let agents = args.agents.unwrap_or(config.session.default_agents);

    let mut manager = build_manager(config)?;
    if args.editor || config.editor.launch_on_spawn {
        manager = with_editor(manager, config);
    }

    let session = manager.spawn(&repo, agents, args.label.as_deref()).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session)?),
        OutputFormat::Text => print_session(&session),
    }

    if !args.no_attach {
        manager.focus(&session.name, None).await?;
    }

    Ok(())
}

fn resolve_repo_path(repo: Option<PathBuf>) -> Result<PathBuf> {
    match repo {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

fn print_session(session: &AgentSession) {
    println!("Session created: {}", session.name);
    println!("  Layout:     {}", session.layout);
    println!("  Repository: {}", session.repository_root.display());
    for pane in &session.panes {
        println!(
            "  {:<11} {:<5} {}",
            pane.role.to_string(),
            pane.multiplexer_pane_id.as_str(),
            pane.working_directory.display()
        );
    }
    println!();
    println!("To attach later:");
    println!("  agentmux focus {}", session.name);
}
