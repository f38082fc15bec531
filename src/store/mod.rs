// ABOUTME: Session store - durable keyed record of every known agent session
//
// Records are replaced whole on every write. Two implementations:
// - FileSessionStore: one JSON file per session, atomic rename on write
// - MemorySessionStore: in-process map for tests and dry runs

pub mod file;
pub mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::AgentSession;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("session '{0}' already exists")]
    DuplicateSession(String),

    #[error("session '{0}' not found")]
    NotFound(String),

    #[error("session store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt session record {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("session record '{0}' was renamed by the update")]
    NameChanged(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Durable storage for agent session records.
///
/// Every write replaces the full record: after a crash a reader sees either
/// the previous record or the new one, never a mix.
pub trait SessionStore {
    /// Insert a new record. Fails with `DuplicateSession` if the name is taken.
    fn create(&self, session: &AgentSession) -> Result<(), StoreError>;

    fn get(&self, name: &str) -> Result<AgentSession, StoreError>;

    /// All records in creation order
    fn list(&self) -> Result<Vec<AgentSession>, StoreError>;

    /// Apply `mutator` to the stored record and write the result back.
    /// The name is the key and must not change.
    fn update(
        &self,
        name: &str,
        mutator: &mut dyn FnMut(&mut AgentSession),
    ) -> Result<AgentSession, StoreError>;

    fn delete(&self, name: &str) -> Result<(), StoreError>;

    fn contains(&self, name: &str) -> Result<bool, StoreError> {
        match self.get(name) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Creation order: timestamp first, name as tie-breaker
pub(crate) fn sort_by_creation(sessions: &mut [AgentSession]) {
    sessions.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}
