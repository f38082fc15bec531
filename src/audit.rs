// ABOUTME: Audit logging for state-changing session operations
//
// Every spawn, close and kill leaves a line in the audit trail so the history
// of a session group can be reconstructed after the fact.
//
// Audit log is written to: <home>/logs/audit.jsonl
// Format: JSON Lines (one JSON object per line) for easy grep/parsing
// Until `AuditLogger::init` runs, entries only reach tracing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};

/// Types of auditable actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    SessionSpawned,
    SpawnRolledBack,
    PaneClosed,
    SessionKilled,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionSpawned => write!(f, "SESSION_SPAWNED"),
            Self::SpawnRolledBack => write!(f, "SPAWN_ROLLED_BACK"),
            Self::PaneClosed => write!(f, "PANE_CLOSED"),
            Self::SessionKilled => write!(f, "SESSION_KILLED"),
        }
    }
}

/// Result of an audited action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResult {
    Success,
    Failed(String),
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the action occurred
    pub timestamp: DateTime<Utc>,

    pub action: AuditAction,

    pub result: AuditResult,

    pub session: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pane: Option<String>,

    /// Repository root or working directory involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, result: AuditResult, session: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            result,
            session: session.to_string(),
            pane: None,
            path: None,
            details: None,
        }
    }

    #[must_use]
    pub fn pane(mut self, pane: impl ToString) -> Self {
        self.pane = Some(pane.to_string());
        self
    }

    #[must_use]
    pub fn path(mut self, path: &Path) -> Self {
        self.path = Some(path.display().to_string());
        self
    }

    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Global audit logger
static AUDIT_LOGGER: Mutex<Option<AuditLogger>> = Mutex::new(None);

/// Audit logger that writes to a JSONL file
pub struct AuditLogger {
    writer: BufWriter<File>,
}

impl AuditLogger {
    /// Initialize the global audit logger writing to `log_path`
    pub fn init(log_path: &Path) -> std::io::Result<()> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(log_path)?;
        let logger = Self {
            writer: BufWriter::new(file),
        };

        let mut global = AUDIT_LOGGER
            .lock()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        *global = Some(logger);

        info!("Audit logging initialized: {:?}", log_path);
        Ok(())
    }

    /// Default location of the audit trail under a logs directory
    pub fn default_path(logs_dir: &Path) -> PathBuf {
        logs_dir.join("audit.jsonl")
    }

    fn write_entry(&mut self, entry: &AuditEntry) -> std::io::Result<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Log an audit entry (main API)
pub fn audit_log(entry: &AuditEntry) {
    info!(
        action = %entry.action,
        result = ?entry.result,
        session = %entry.session,
        pane = ?entry.pane,
        "AUDIT: {}",
        entry.action
    );

    let mut global = match AUDIT_LOGGER.lock() {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to acquire audit logger lock: {}", e);
            return;
        }
    };

    if let Some(ref mut logger) = *global {
        if let Err(e) = logger.write_entry(entry) {
            error!("Failed to write audit entry: {}", e);
        }
    }
}
