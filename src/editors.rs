//! Companion editor detection and launching.
//!
//! Spawn can open an editor on the main pane's working directory. This
//! module holds the known-editor table, the resolution fallback chain and
//! the launcher that starts the editor detached from agentmux.

use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Supported editors with their display names and command-line executables.
///
/// Only editors that open their own window: the launcher runs detached with
/// no terminal attached.
pub const EDITORS: &[(&str, &str)] = &[
    ("VS Code", "code"),
    ("Cursor", "cursor"),
    ("Zed", "zed"),
    ("Sublime Text", "subl"),
];

/// Editors that need a terminal and cannot be launched detached.
const TERMINAL_EDITORS: &[&str] = &[
    "vi", "vim", "nvim", "emacs", "nano", "micro", "hx", "helix", "kak", "ed", "pico", "joe",
];

fn is_terminal_editor(program: &str) -> bool {
    let base = Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(program);
    TERMINAL_EDITORS.contains(&base)
}

/// Check if a command exists on the system (cross-platform).
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Convert command to editor display name.
#[must_use]
pub fn editor_command_to_name(command: &str) -> Option<&'static str> {
    EDITORS
        .iter()
        .find(|(_, cmd)| *cmd == command)
        .map(|(name, _)| *name)
}

fn program_of(command: &str) -> Option<&str> {
    command.split_whitespace().next()
}

/// Resolve which editor to use via fallback chain:
/// 1. configured command
/// 2. $EDITOR env var
/// 3. first installed editor from [`EDITORS`]
///
/// Terminal editors are skipped at every step.
pub fn resolve_editor(configured: Option<&str>) -> Option<String> {
    let env_editor = std::env::var("EDITOR").ok();
    resolve_editor_with(configured, env_editor.as_deref(), command_exists)
}

fn resolve_editor_with(
    configured: Option<&str>,
    env_editor: Option<&str>,
    exists: impl Fn(&str) -> bool,
) -> Option<String> {
    let usable = |command: &&str| match program_of(command) {
        Some(program) if is_terminal_editor(program) => {
            debug!("Skipping terminal editor {}", program);
            false
        }
        Some(program) => exists(program),
        None => false,
    };

    if let Some(command) = configured.filter(usable) {
        return Some(command.to_string());
    }

    if let Some(command) = env_editor.filter(usable) {
        return Some(command.to_string());
    }

    EDITORS
        .iter()
        .map(|(_, cmd)| *cmd)
        .find(|cmd| exists(cmd))
        .map(ToString::to_string)
}

/// Starts an editor on a directory without waiting for it.
pub trait EditorLauncher {
    fn launch(&self, working_dir: &Path) -> std::io::Result<()>;
}

/// Launches a shell-free command line (`program arg...`) with the directory appended
#[derive(Debug, Clone)]
pub struct SystemEditorLauncher {
    command: String,
}

impl SystemEditorLauncher {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl EditorLauncher for SystemEditorLauncher {
    fn launch(&self, working_dir: &Path) -> std::io::Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty editor command")
        })?;

        debug!("Launching editor {} on {}", self.command, working_dir.display());
        let child = Command::new(program)
            .args(parts)
            .arg(working_dir)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        info!(
            "Opened {} (pid {}) on {}",
            editor_command_to_name(program).unwrap_or(program),
            child.id(),
            working_dir.display()
        );
        Ok(())
    }
}
