// ABOUTME: CLI focus command - select a pane and attach to its session
//
// Inside tmux the current client is switched instead of nesting an attach.

use anyhow::Result;

use super::util::{build_manager, resolve_session};
use super::FocusArgs;
use crate::config::AppConfig;

/// Execute the focus command
pub async fn execute(args: FocusArgs, config: &AppConfig) -> Result<()> {
    let manager = build_manager(config)?;
    let name = resolve_session(&manager, &args.session)?;

    if std::env::var_os("TMUX").is_none() {
        println!("Attaching to session: {name}");
        println!("Detach with: Ctrl+B, then D");
        println!();
    }

    manager.focus(&name, args.role).await?;
    Ok(())
}
