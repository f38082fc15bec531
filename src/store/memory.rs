// ABOUTME: In-memory session store used by tests and anything that must not touch disk

use std::collections::HashMap;
use std::sync::Mutex;

use super::{sort_by_creation, SessionStore, StoreError};
use crate::models::AgentSession;

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, AgentSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_sessions<T>(&self, f: impl FnOnce(&mut HashMap<String, AgentSession>) -> T) -> T {
        // A poisoned map is still a consistent map: every write is a single insert/remove
        let mut guard = match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, session: &AgentSession) -> Result<(), StoreError> {
        self.with_sessions(|sessions| {
            if sessions.contains_key(&session.name) {
                return Err(StoreError::DuplicateSession(session.name.clone()));
            }
            sessions.insert(session.name.clone(), session.clone());
            Ok(())
        })
    }

    fn get(&self, name: &str) -> Result<AgentSession, StoreError> {
        self.with_sessions(|sessions| {
            sessions
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(name.to_string()))
        })
    }

    fn list(&self) -> Result<Vec<AgentSession>, StoreError> {
        let mut all: Vec<_> = self.with_sessions(|sessions| sessions.values().cloned().collect());
        sort_by_creation(&mut all);
        Ok(all)
    }

    fn update(
        &self,
        name: &str,
        mutator: &mut dyn FnMut(&mut AgentSession),
    ) -> Result<AgentSession, StoreError> {
        self.with_sessions(|sessions| {
            let mut session = sessions
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

            mutator(&mut session);
            if session.name != name {
                return Err(StoreError::NameChanged(name.to_string()));
            }

            sessions.insert(name.to_string(), session.clone());
            Ok(session)
        })
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.with_sessions(|sessions| {
            sessions
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound(name.to_string()))
        })
    }
}
