// ABOUTME: CLI close and kill commands
//
// close: remove one secondary pane, keeping the session and its main pane
// kill: remove the tmux session and its record; repeating it is harmless

use anyhow::Result;
use serde_json::json;

use super::util::{build_manager, resolve_session};
use super::{CloseArgs, KillArgs, OutputFormat};
use crate::config::AppConfig;
use crate::session::{KillOutcome, SessionError};

/// Execute the close command
pub async fn execute_close(args: CloseArgs, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let manager = build_manager(config)?;
    let name = resolve_session(&manager, &args.session)?;

    let session = manager.close(&name, args.role).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session)?),
        OutputFormat::Text => {
            let remaining: Vec<String> = session.roles().iter().map(ToString::to_string).collect();
            println!("Closed {} of {}", args.role, name);
            println!("  Remaining: {}", remaining.join(", "));
        }
    }

    Ok(())
}

/// Execute the kill command
pub async fn execute_kill(args: KillArgs, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let manager = build_manager(config)?;

    // An unknown name is not an error: kill must be repeatable
    let name = match resolve_session(&manager, &args.session) {
        Ok(name) => name,
        Err(e) if matches!(e.downcast_ref::<SessionError>(), Some(SessionError::NotFound(_))) => {
            args.session.clone()
        }
        Err(e) => return Err(e),
    };

    let outcome = manager.kill(&name).await?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "session": name, "outcome": outcome }))?
            );
        }
        OutputFormat::Text => match outcome {
            KillOutcome::Killed => println!("Killed session {name}"),
            KillOutcome::AlreadyGone => {
                println!("Session {name} was already gone from tmux; record removed");
            }
            KillOutcome::NoRecord => println!("No session named {name}; nothing to do"),
        },
    }

    Ok(())
}
