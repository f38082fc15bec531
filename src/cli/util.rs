// ABOUTME: Shared CLI utilities for building the session manager and resolving session names
//
// Every command talks to the same stack: tmux driver, file store under the
// configured directory and git worktree binder.

use anyhow::{Context, Result};
use tracing::warn;

use crate::config::AppConfig;
use crate::editors::{resolve_editor, SystemEditorLauncher};
use crate::git::GitWorktreeBinder;
use crate::session::SessionManager;
use crate::store::FileSessionStore;
use crate::tmux::TmuxDriver;

pub type CliManager = SessionManager<TmuxDriver, FileSessionStore, GitWorktreeBinder>;

/// Build the production manager from configuration
pub fn build_manager(config: &AppConfig) -> Result<CliManager> {
    let store_dir = config.store_dir()?;
    let store = FileSessionStore::open(&store_dir)
        .with_context(|| format!("Failed to open session store at {}", store_dir.display()))?;

    Ok(SessionManager::new(
        TmuxDriver::new(&config.tmux),
        store,
        GitWorktreeBinder::new(),
    )
    .with_agent_command(config.agent.command.clone())
    .with_prefix(config.session.prefix.clone()))
}

/// Attach the companion editor, if one can be resolved
pub fn with_editor(manager: CliManager, config: &AppConfig) -> CliManager {
    match resolve_editor(config.editor.command.as_deref()) {
        Some(command) => manager.with_editor(Box::new(SystemEditorLauncher::new(command))),
        None => {
            warn!("No editor found; spawning without one");
            eprintln!("warning: no editor found (set editor.command or $EDITOR)");
            manager
        }
    }
}

/// Find a session by exact name or unique prefix
pub fn resolve_session(manager: &CliManager, query: &str) -> Result<String> {
    Ok(manager.resolve(query)?)
}

/// Truncate a string to fit in the given width (character-aware for UTF-8)
pub fn truncate(s: &str, max_len: usize) -> String {
    if max_len <= 3 {
        return ".".repeat(max_len);
    }
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
