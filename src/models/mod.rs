// ABOUTME: Core data models for agent sessions and their panes

pub mod pane;
pub mod session;

pub use pane::{AgentPane, PaneHandle, PaneRole, ParseRoleError};
pub use session::{sanitize_label, session_name, AgentSession, SessionHandle, SessionState};
