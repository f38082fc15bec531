// ABOUTME: Multiplexer driver seam - the primitives the session manager needs from tmux
//
// The session manager only talks to `MultiplexerDriver`; `TmuxDriver` is the
// production implementation. Calls are awaited one at a time by the caller,
// there is no implicit timeout.

pub mod driver;

pub use driver::TmuxDriver;

use std::path::Path;
use thiserror::Error;

use crate::layout::Orientation;
use crate::models::{PaneHandle, SessionHandle};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The targeted session or pane does not exist (or the server is gone)
    #[error("handle not found: {0}")]
    NotFound(String),

    /// The multiplexer is not installed or cannot be executed
    #[error("multiplexer unavailable: {0}")]
    Unavailable(String),

    #[error("tmux {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("tmux {command} returned unexpected output: {output:?}")]
    UnexpectedOutput { command: String, output: String },
}

impl DriverError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Operations issued against the terminal multiplexer.
#[allow(async_fn_in_trait)]
pub trait MultiplexerDriver {
    /// Create a detached session whose first pane starts in `working_dir`
    async fn create_detached_session(
        &self,
        name: &str,
        working_dir: &Path,
    ) -> Result<SessionHandle, DriverError>;

    /// Split `target`, giving the new pane `ratio` percent of its area
    async fn split(
        &self,
        target: &PaneHandle,
        orientation: Orientation,
        ratio: u8,
        working_dir: &Path,
    ) -> Result<PaneHandle, DriverError>;

    async fn select_pane(&self, pane: &PaneHandle) -> Result<(), DriverError>;

    /// Type `text` into the pane literally, then press Enter if `submit`
    async fn send_keys(&self, pane: &PaneHandle, text: &str, submit: bool) -> Result<(), DriverError>;

    async fn kill_pane(&self, pane: &PaneHandle) -> Result<(), DriverError>;

    async fn kill_session(&self, session: &SessionHandle) -> Result<(), DriverError>;

    /// Live panes of a session, in multiplexer order
    async fn list_panes(&self, session: &SessionHandle) -> Result<Vec<PaneHandle>, DriverError>;

    /// Bring the session to the foreground of the operator's terminal
    async fn attach_session(&self, session: &SessionHandle) -> Result<(), DriverError>;
}
