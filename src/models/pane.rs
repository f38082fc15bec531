// ABOUTME: Pane data model - one multiplexer pane bound to one agent and working directory

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Opaque multiplexer pane identifier (tmux `%N`), stable for the pane's lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneHandle(pub String);

impl PaneHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaneHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid pane role '{0}' (expected 'main' or 'secondaryN')")]
pub struct ParseRoleError(pub String);

/// Role of a pane inside its session. Unique within a session.
///
/// Orders `main` first, then secondaries by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PaneRole {
    Main,
    Secondary(u8),
}

impl PaneRole {
    pub const fn is_main(self) -> bool {
        matches!(self, Self::Main)
    }
}

impl fmt::Display for PaneRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => f.write_str("main"),
            Self::Secondary(n) => write!(f, "secondary{n}"),
        }
    }
}

impl FromStr for PaneRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "main" {
            return Ok(Self::Main);
        }

        lower
            .strip_prefix("secondary")
            .and_then(|index| index.parse::<u8>().ok())
            .filter(|index| *index >= 1)
            .map(Self::Secondary)
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

impl From<PaneRole> for String {
    fn from(role: PaneRole) -> Self {
        role.to_string()
    }
}

impl TryFrom<String> for PaneRole {
    type Error = ParseRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One agent's pane. Owned exclusively by its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPane {
    pub role: PaneRole,
    pub working_directory: PathBuf,
    pub multiplexer_pane_id: PaneHandle,
}

impl AgentPane {
    pub fn new(role: PaneRole, working_directory: PathBuf, multiplexer_pane_id: PaneHandle) -> Self {
        Self {
            role,
            working_directory,
            multiplexer_pane_id,
        }
    }
}
