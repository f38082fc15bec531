// ABOUTME: File-backed session store - one JSON record per session under a directory
//
// Layout: <dir>/<session-name>.json
// Writes go to a temp file in the same directory, are fsynced, then renamed
// over the target so a crash leaves either the old or the new record.

use std::fs;
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{sort_by_creation, SessionStore, StoreError};
use crate::models::AgentSession;

const RECORD_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        debug!("Opened session store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `name`, or `None` if the name cannot be a file name
    fn record_path(&self, name: &str) -> Option<PathBuf> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\'])
            && name != "..";
        valid.then(|| self.dir.join(format!("{name}.{RECORD_EXTENSION}")))
    }

    fn existing_record_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        self.record_path(name)
            .filter(|path| path.exists())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn read_record(path: &Path) -> Result<AgentSession, StoreError> {
        let file = fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize `session` into a synced temp file next to the records
    fn stage_record(&self, session: &AgentSession) -> Result<NamedTempFile, StoreError> {
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let json = serde_json::to_vec_pretty(session).map_err(|source| StoreError::Corrupt {
            path: staged.path().to_path_buf(),
            source,
        })?;

        staged
            .write_all(&json)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| StoreError::io(staged.path(), e))?;

        Ok(staged)
    }

    #[cfg(unix)]
    fn sync_dir(&self) {
        // Makes the rename itself durable
        if let Err(e) = fs::File::open(&self.dir).and_then(|dir| dir.sync_all()) {
            warn!("Failed to sync store directory {}: {}", self.dir.display(), e);
        }
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) {}
}

impl SessionStore for FileSessionStore {
    fn create(&self, session: &AgentSession) -> Result<(), StoreError> {
        let path = self.record_path(&session.name).ok_or_else(|| {
            StoreError::io(
                &self.dir,
                std::io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("'{}' is not a valid session name", session.name),
                ),
            )
        })?;

        let staged = self.stage_record(session)?;
        staged.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == ErrorKind::AlreadyExists {
                StoreError::DuplicateSession(session.name.clone())
            } else {
                StoreError::io(&path, e.error)
            }
        })?;
        self.sync_dir();

        debug!("Created session record {}", path.display());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<AgentSession, StoreError> {
        let path = self.existing_record_path(name)?;
        Self::read_record(&path)
    }

    fn list(&self) -> Result<Vec<AgentSession>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        let mut sessions = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }

            match Self::read_record(&path) {
                Ok(session) => sessions.push(session),
                Err(e) => warn!("Skipping unreadable session record: {}", e),
            }
        }

        sort_by_creation(&mut sessions);
        Ok(sessions)
    }

    fn update(
        &self,
        name: &str,
        mutator: &mut dyn FnMut(&mut AgentSession),
    ) -> Result<AgentSession, StoreError> {
        let path = self.existing_record_path(name)?;
        let mut session = Self::read_record(&path)?;

        mutator(&mut session);
        if session.name != name {
            return Err(StoreError::NameChanged(name.to_string()));
        }

        let staged = self.stage_record(&session)?;
        staged
            .persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;
        self.sync_dir();

        debug!("Replaced session record {}", path.display());
        Ok(session)
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.existing_record_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                self.sync_dir();
                debug!("Deleted session record {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(name.to_string())),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }
}
