// ABOUTME: Session lifecycle - the manager that ties layout, workspaces, tmux and the store together

pub mod error;
pub mod manager;

pub use error::{SessionError, EXIT_PARTIAL_BROADCAST};
pub use manager::{
    BroadcastReport, KillOutcome, PaneSummary, SessionManager, SessionSummary,
};
