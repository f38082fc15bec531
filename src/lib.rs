// ABOUTME: Library crate for agentmux exposing the session lifecycle for the binary and tests

#![allow(missing_docs)]

pub mod audit;
pub mod cli;
pub mod config;
pub mod editors;
pub mod git;
pub mod layout;
pub mod models;
pub mod session;
pub mod store;
pub mod tmux;

pub use layout::{plan, Layout, LayoutPlan, Orientation, SplitStep};
pub use models::{AgentPane, AgentSession, PaneHandle, PaneRole, SessionHandle, SessionState};
pub use session::{BroadcastReport, KillOutcome, SessionError, SessionManager, SessionSummary};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError};
pub use tmux::{DriverError, MultiplexerDriver, TmuxDriver};
