// ABOUTME: Agent session data model - a named group of panes created by one spawn
//
// Sessions are immutable apart from their pane list, which only shrinks
// (close). The record is persisted whole, see crate::store.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::pane::{AgentPane, PaneRole};
use crate::layout::Layout;

lazy_static! {
    /// Runs of characters that are not safe in a tmux session name
    static ref UNSAFE_LABEL_CHARS: Regex = Regex::new(r"[^a-z0-9_-]+").unwrap();
}

/// Opaque multiplexer session identifier (the tmux session name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(pub String);

impl SessionHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a stored session.
///
/// Spawn records a session only once it is created and kill deletes the
/// record, so nothing stored is ever planned or terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    PartiallyLiveClosed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Created => "created",
            Self::PartiallyLiveClosed => "partially-closed",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSession {
    pub name: String,
    pub repository_root: PathBuf,
    pub layout: Layout,
    pub multiplexer_session_handle: SessionHandle,
    /// Creation order, `main` first
    pub panes: Vec<AgentPane>,
    pub created_at: DateTime<Utc>,
}

impl AgentSession {
    pub fn pane(&self, role: PaneRole) -> Option<&AgentPane> {
        self.panes.iter().find(|pane| pane.role == role)
    }

    pub fn main_pane(&self) -> Option<&AgentPane> {
        self.pane(PaneRole::Main)
    }

    pub fn roles(&self) -> Vec<PaneRole> {
        self.panes.iter().map(|pane| pane.role).collect()
    }

    pub fn state(&self) -> SessionState {
        if self.panes.len() < self.layout.pane_count() {
            SessionState::PartiallyLiveClosed
        } else {
            SessionState::Created
        }
    }
}

/// Turn a free-form user label into a tmux-safe name fragment.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_label(label: &str) -> Option<String> {
    let lowered = label.trim().to_lowercase();
    let cleaned = UNSAFE_LABEL_CHARS.replace_all(&lowered, "-");
    let trimmed = cleaned.trim_matches('-');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Derive a session name from its creation time and an optional label:
/// `<prefix>-<YYYYmmdd-HHMMSS>[-<label>]`
pub fn session_name(prefix: &str, created_at: DateTime<Utc>, label: Option<&str>) -> String {
    let stamp = created_at.format("%Y%m%d-%H%M%S");
    match label.and_then(sanitize_label) {
        Some(label) => format!("{prefix}-{stamp}-{label}"),
        None => format!("{prefix}-{stamp}"),
    }
}
