// ABOUTME: Error taxonomy of session operations and its mapping to process exit codes

use thiserror::Error;

use crate::git::BindError;
use crate::layout::LayoutError;
use crate::models::PaneRole;
use crate::store::StoreError;
use crate::tmux::DriverError;

/// Exit code for a broadcast where at least one pane failed
pub const EXIT_PARTIAL_BROADCAST: u8 = 6;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("unsupported layout: {0} secondary agents requested (supported: 1-4)")]
    UnsupportedLayout(usize),

    #[error("insufficient workspaces: {requested} requested, {available} available")]
    InsufficientWorkspaces { requested: usize, available: usize },

    #[error("session '{0}' already exists")]
    DuplicateSession(String),

    #[error("session '{0}' not found")]
    NotFound(String),

    #[error("session '{query}' is ambiguous, candidates: {}", .candidates.join(", "))]
    Ambiguous { query: String, candidates: Vec<String> },

    #[error("session '{session}' has no pane '{role}'")]
    PaneNotFound { session: String, role: PaneRole },

    #[error("cannot close '{role}': it is the last pane of session '{session}' (use kill)")]
    CannotCloseLastPane { session: String, role: PaneRole },

    #[error("cannot close 'main' of session '{0}': it lives as long as the session; run 'agentmux kill {0}' to end it")]
    CannotCloseMain(String),

    #[error("tmux unavailable: {0}")]
    DriverUnavailable(String),

    #[error("session '{session}' no longer exists in tmux ({detail}); run 'agentmux kill {session}' and spawn again")]
    HandleStale { session: String, detail: String },

    #[error("pane '{role}' of session '{session}' no longer exists in tmux while the session is still running ({detail})")]
    PaneStale {
        session: String,
        role: PaneRole,
        detail: String,
    },

    #[error("{operation} failed for {target}: {source}")]
    Driver {
        operation: &'static str,
        target: String,
        #[source]
        source: DriverError,
    },

    #[error(transparent)]
    Store(StoreError),

    #[error("workspace binding failed: {0}")]
    Workspace(BindError),

    #[error("{source}; rollback incomplete: {}", .failures.join("; "))]
    RollbackIncomplete {
        #[source]
        source: Box<SessionError>,
        failures: Vec<String>,
    },
}

impl SessionError {
    /// Wrap a driver failure, lifting `Unavailable` to its own kind
    pub fn driver(operation: &'static str, target: impl Into<String>, source: DriverError) -> Self {
        match source {
            DriverError::Unavailable(message) => Self::DriverUnavailable(message),
            source => Self::Driver {
                operation,
                target: target.into(),
                source,
            },
        }
    }

    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::UnsupportedLayout(_)
            | Self::InsufficientWorkspaces { .. }
            | Self::DuplicateSession(_)
            | Self::CannotCloseLastPane { .. }
            | Self::CannotCloseMain(_) => 2,
            Self::NotFound(_) | Self::Ambiguous { .. } | Self::PaneNotFound { .. } => 3,
            Self::DriverUnavailable(_) | Self::Driver { .. } | Self::RollbackIncomplete { .. } => 4,
            Self::HandleStale { .. } | Self::PaneStale { .. } => 5,
            Self::Store(StoreError::DuplicateSession(_)) => 2,
            Self::Store(StoreError::NotFound(_)) => 3,
            Self::Store(_) | Self::Workspace(_) => 1,
        }
    }
}

impl From<LayoutError> for SessionError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::Unsupported(n) => Self::UnsupportedLayout(n),
        }
    }
}

impl From<BindError> for SessionError {
    fn from(err: BindError) -> Self {
        match err {
            BindError::InsufficientWorkspaces {
                requested,
                available,
            } => Self::InsufficientWorkspaces {
                requested,
                available,
            },
            other => Self::Workspace(other),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateSession(name) => Self::DuplicateSession(name),
            StoreError::NotFound(name) => Self::NotFound(name),
            other => Self::Store(other),
        }
    }
}
