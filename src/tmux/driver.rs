// ABOUTME: tmux implementation of the multiplexer driver
//
// Shells out to the tmux binary for every primitive:
// - new-session / split-window print the created handle via -P -F
// - session targets use the `=name` exact-match form so a gone session never
//   prefix-matches a different one
// - stderr is classified into NotFound vs CommandFailed

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{DriverError, MultiplexerDriver};
use crate::config::TmuxConfig;
use crate::layout::Orientation;
use crate::models::{PaneHandle, SessionHandle};

/// Detached sessions start at this size; splits are percentages of it and
/// tmux rescales them on attach
const INITIAL_WIDTH: &str = "200";
const INITIAL_HEIGHT: &str = "50";

/// stderr fragments tmux prints when a target no longer exists
const NOT_FOUND_MARKERS: &[&str] = &[
    "can't find",
    "no server running",
    "session not found",
    "pane not found",
    "error connecting to",
    "no such session",
];

#[derive(Debug, Clone)]
pub struct TmuxDriver {
    binary: Option<PathBuf>,
    history_limit: u32,
    mouse: bool,
}

impl TmuxDriver {
    /// Locate tmux on PATH. A missing binary is reported on first use.
    pub fn new(config: &TmuxConfig) -> Self {
        let binary = which::which("tmux").ok();
        if binary.is_none() {
            warn!("tmux not found on PATH");
        }

        Self {
            binary,
            history_limit: config.history_limit,
            mouse: config.mouse,
        }
    }

    fn exact_session_target(session: &SessionHandle) -> String {
        format!("={}", session.as_str())
    }

    /// Run one tmux command and return its trimmed stdout
    async fn run<I, S>(&self, args: I) -> Result<String, DriverError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let binary = self
            .binary
            .as_ref()
            .ok_or_else(|| DriverError::Unavailable("tmux is not installed or not on PATH".to_string()))?;

        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let command = args
            .first()
            .map_or_else(|| "tmux".to_string(), |a| a.to_string_lossy().into_owned());
        debug!("tmux {:?}", args);

        let output = Command::new(binary).args(&args).output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DriverError::Unavailable(format!("{}: {e}", binary.display()))
            } else {
                DriverError::CommandFailed {
                    command: command.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&command, &stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Apply history and mouse settings; failures only degrade comfort
    async fn configure_session(&self, session: &SessionHandle) {
        let target = Self::exact_session_target(session);
        let history = self.history_limit.to_string();
        let mouse = if self.mouse { "on" } else { "off" };

        for (option, value) in [("history-limit", history.as_str()), ("mouse", mouse)] {
            if let Err(e) = self.run(["set-option", "-t", &target, option, value]).await {
                warn!("Failed to set tmux option {} on {}: {}", option, session, e);
            }
        }
    }
}

/// Map a failed tmux invocation to a driver error
fn classify_failure(command: &str, stderr: &str) -> DriverError {
    let message = stderr.trim().to_string();
    let lower = message.to_lowercase();

    if NOT_FOUND_MARKERS.iter().any(|marker| lower.contains(marker)) {
        DriverError::NotFound(message)
    } else {
        DriverError::CommandFailed {
            command: command.to_string(),
            message,
        }
    }
}

const fn orientation_flag(orientation: Orientation) -> &'static str {
    match orientation {
        // tmux names splits by the resulting layout: -h puts panes side by side
        Orientation::Vertical => "-h",
        Orientation::Horizontal => "-v",
    }
}

impl MultiplexerDriver for TmuxDriver {
    async fn create_detached_session(
        &self,
        name: &str,
        working_dir: &Path,
    ) -> Result<SessionHandle, DriverError> {
        let created = self
            .run([
                OsStr::new("new-session"),
                OsStr::new("-d"),
                OsStr::new("-s"),
                OsStr::new(name),
                OsStr::new("-c"),
                working_dir.as_os_str(),
                OsStr::new("-x"),
                OsStr::new(INITIAL_WIDTH),
                OsStr::new("-y"),
                OsStr::new(INITIAL_HEIGHT),
                OsStr::new("-P"),
                OsStr::new("-F"),
                OsStr::new("#{session_name}"),
            ])
            .await?;

        let handle = if created.is_empty() {
            SessionHandle::new(name)
        } else {
            SessionHandle::new(created)
        };

        self.configure_session(&handle).await;
        info!("Created tmux session {} in {}", handle, working_dir.display());
        Ok(handle)
    }

    async fn split(
        &self,
        target: &PaneHandle,
        orientation: Orientation,
        ratio: u8,
        working_dir: &Path,
    ) -> Result<PaneHandle, DriverError> {
        let size = format!("{ratio}%");
        let pane_id = self
            .run([
                OsStr::new("split-window"),
                OsStr::new("-t"),
                OsStr::new(target.as_str()),
                OsStr::new(orientation_flag(orientation)),
                OsStr::new("-l"),
                OsStr::new(&size),
                OsStr::new("-c"),
                working_dir.as_os_str(),
                OsStr::new("-P"),
                OsStr::new("-F"),
                OsStr::new("#{pane_id}"),
            ])
            .await?;

        if !pane_id.starts_with('%') {
            return Err(DriverError::UnexpectedOutput {
                command: "split-window".to_string(),
                output: pane_id,
            });
        }

        debug!("Split {} ({:?}, {}) -> {}", target, orientation, size, pane_id);
        Ok(PaneHandle::new(pane_id))
    }

    async fn select_pane(&self, pane: &PaneHandle) -> Result<(), DriverError> {
        self.run(["select-window", "-t", pane.as_str()]).await?;
        self.run(["select-pane", "-t", pane.as_str()]).await?;
        Ok(())
    }

    async fn send_keys(&self, pane: &PaneHandle, text: &str, submit: bool) -> Result<(), DriverError> {
        // -l sends the text literally instead of parsing key names
        if !text.is_empty() {
            self.run(["send-keys", "-t", pane.as_str(), "-l", "--", text])
                .await?;
        }

        if submit {
            self.run(["send-keys", "-t", pane.as_str(), "Enter"]).await?;
        }

        Ok(())
    }

    async fn kill_pane(&self, pane: &PaneHandle) -> Result<(), DriverError> {
        self.run(["kill-pane", "-t", pane.as_str()]).await?;
        info!("Killed tmux pane {}", pane);
        Ok(())
    }

    async fn kill_session(&self, session: &SessionHandle) -> Result<(), DriverError> {
        self.run(["kill-session", "-t", &Self::exact_session_target(session)])
            .await?;
        info!("Killed tmux session {}", session);
        Ok(())
    }

    async fn list_panes(&self, session: &SessionHandle) -> Result<Vec<PaneHandle>, DriverError> {
        let output = self
            .run([
                "list-panes",
                "-s",
                "-t",
                &Self::exact_session_target(session),
                "-F",
                "#{pane_id}",
            ])
            .await?;

        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PaneHandle::new)
            .collect())
    }

    async fn attach_session(&self, session: &SessionHandle) -> Result<(), DriverError> {
        let target = Self::exact_session_target(session);

        // Inside tmux, attaching would nest; switch the current client instead
        if std::env::var_os("TMUX").is_some() {
            self.run(["switch-client", "-t", &target]).await?;
            return Ok(());
        }

        let binary = self
            .binary
            .as_ref()
            .ok_or_else(|| DriverError::Unavailable("tmux is not installed or not on PATH".to_string()))?;

        info!("Attaching to tmux session {}", session);
        let status = Command::new(binary)
            .args(["attach-session", "-t", &target])
            .status()
            .await
            .map_err(|e| DriverError::CommandFailed {
                command: "attach-session".to_string(),
                message: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(DriverError::CommandFailed {
                command: "attach-session".to_string(),
                message: format!("exited with {status}"),
            })
        }
    }
}
