// ABOUTME: Session manager - spawn, address and tear down groups of agent panes
//
// Drives the multiplexer one command at a time and keeps the session store in
// step with it:
// - spawn realizes a layout plan and records the session only once every pane is live
// - any failure after the multiplexer session exists rolls the session back
// - send/broadcast/focus/list never mutate the stored record
// - close removes one pane, kill removes the session and its record together

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::SessionError;
use crate::audit::{audit_log, AuditAction, AuditEntry, AuditResult};
use crate::editors::EditorLauncher;
use crate::git::WorkspaceBinder;
use crate::layout::{self, Layout, LayoutPlan};
use crate::models::{
    session_name, AgentPane, AgentSession, PaneHandle, PaneRole, SessionHandle, SessionState,
};
use crate::store::{SessionStore, StoreError};
use crate::tmux::{DriverError, MultiplexerDriver};

const DEFAULT_AGENT_COMMAND: &str = "claude";
const DEFAULT_PREFIX: &str = "agents";

/// Outcome of delivering one message to every pane of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub delivered: Vec<PaneRole>,
    /// Panes the driver rejected, with its message
    pub failed: Vec<(PaneRole, String)>,
}

impl BroadcastReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_roles(&self) -> Vec<PaneRole> {
        self.failed.iter().map(|(role, _)| *role).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KillOutcome {
    /// The multiplexer session was removed along with the record
    Killed,
    /// The multiplexer session was already gone; the record was removed
    AlreadyGone,
    /// Nothing was stored under that name
    NoRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaneSummary {
    pub role: PaneRole,
    pub working_directory: PathBuf,
    pub pane_id: String,
    /// Whether the pane handle still resolves in the multiplexer
    pub live: bool,
}

/// Read-only view of one stored session plus a liveness probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub name: String,
    pub repository_root: PathBuf,
    pub layout: Layout,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub panes: Vec<PaneSummary>,
}

impl SessionSummary {
    pub fn live_panes(&self) -> usize {
        self.panes.iter().filter(|pane| pane.live).count()
    }

    pub fn all_live(&self) -> bool {
        self.panes.iter().all(|pane| pane.live)
    }
}

pub struct SessionManager<D, S, W> {
    driver: D,
    store: S,
    binder: W,
    agent_command: String,
    prefix: String,
    editor: Option<Box<dyn EditorLauncher>>,
}

impl<D, S, W> SessionManager<D, S, W>
where
    D: MultiplexerDriver,
    S: SessionStore,
    W: WorkspaceBinder,
{
    pub fn new(driver: D, store: S, binder: W) -> Self {
        Self {
            driver,
            store,
            binder,
            agent_command: DEFAULT_AGENT_COMMAND.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            editor: None,
        }
    }

    #[must_use]
    pub fn with_agent_command(mut self, command: impl Into<String>) -> Self {
        self.agent_command = command.into();
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Open `launcher` on the main working directory after every spawn
    #[must_use]
    pub fn with_editor(mut self, launcher: Box<dyn EditorLauncher>) -> Self {
        self.editor = Some(launcher);
        self
    }

    pub const fn driver(&self) -> &D {
        &self.driver
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Resolve an exact session name or a unique prefix of one
    pub fn resolve(&self, query: &str) -> Result<String, SessionError> {
        let names: Vec<String> = self
            .store
            .list()?
            .into_iter()
            .map(|session| session.name)
            .collect();

        if names.iter().any(|name| name == query) {
            return Ok(query.to_string());
        }

        let mut matches: Vec<String> = names
            .into_iter()
            .filter(|name| name.starts_with(query))
            .collect();

        match matches.len() {
            0 => Err(SessionError::NotFound(query.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(SessionError::Ambiguous {
                query: query.to_string(),
                candidates: matches,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Result<AgentSession, SessionError> {
        Ok(self.store.get(name)?)
    }

    pub async fn spawn(
        &self,
        repository_root: &Path,
        secondaries: usize,
        label: Option<&str>,
    ) -> Result<AgentSession, SessionError> {
        self.spawn_at(repository_root, secondaries, label, Utc::now())
            .await
    }

    /// Spawn with an explicit creation time, which also fixes the session name
    pub async fn spawn_at(
        &self,
        repository_root: &Path,
        secondaries: usize,
        label: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<AgentSession, SessionError> {
        // Planned: everything here runs before the first multiplexer command
        let plan = layout::plan(secondaries)?;
        let name = session_name(&self.prefix, created_at, label);

        if self.store.contains(&name)? {
            return Err(SessionError::DuplicateSession(name));
        }

        let pane_count = plan.layout.pane_count();
        let directories = self.binder.bind(repository_root, pane_count)?;
        if directories.len() < pane_count {
            return Err(SessionError::InsufficientWorkspaces {
                requested: pane_count,
                available: directories.len(),
            });
        }

        info!(
            "Spawning session {} ({}) in {}",
            name,
            plan.layout,
            repository_root.display()
        );
        debug!("{} pane creation order: {:?}", name, plan.roles());

        let handle = self
            .driver
            .create_detached_session(&name, &directories[0])
            .await
            .map_err(|e| SessionError::driver("create-session", &name, e))?;

        let draft = SessionDraft {
            name: &name,
            repository_root,
            handle: &handle,
            plan: &plan,
            directories: &directories,
            created_at,
        };

        match self.realize(&draft).await {
            Ok(session) => {
                audit_log(
                    &AuditEntry::new(AuditAction::SessionSpawned, AuditResult::Success, &name)
                        .path(repository_root)
                        .details(format!("layout {}, {} panes", plan.layout, session.panes.len())),
                );
                info!("Session {} created with {} panes", name, session.panes.len());
                Ok(session)
            }
            Err(err) => Err(self.roll_back(&name, &handle, err).await),
        }
    }

    /// Create every pane, start the agents and record the session
    async fn realize(&self, draft: &SessionDraft<'_>) -> Result<AgentSession, SessionError> {
        let main = self
            .driver
            .list_panes(draft.handle)
            .await
            .map_err(|e| SessionError::driver("list-panes", draft.name, e))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                SessionError::driver(
                    "list-panes",
                    draft.name,
                    DriverError::UnexpectedOutput {
                        command: "list-panes".to_string(),
                        output: String::new(),
                    },
                )
            })?;

        let mut panes = vec![AgentPane::new(
            PaneRole::Main,
            draft.directory_for(PaneRole::Main)?,
            main,
        )];

        for step in &draft.plan.steps {
            let parent = panes
                .iter()
                .find(|pane| pane.role == step.parent)
                .map(|pane| pane.multiplexer_pane_id.clone())
                .ok_or_else(|| SessionError::PaneNotFound {
                    session: draft.name.to_string(),
                    role: step.parent,
                })?;

            let directory = draft.directory_for(step.new_pane)?;
            let created = self
                .driver
                .split(&parent, step.orientation, step.ratio, &directory)
                .await
                .map_err(|e| SessionError::driver("split", format!("{} {}", draft.name, step.parent), e))?;

            debug!("{} {} -> {}", draft.name, step.new_pane, created);
            panes.push(AgentPane::new(step.new_pane, directory, created));
        }

        for pane in &panes {
            self.driver
                .send_keys(&pane.multiplexer_pane_id, &self.agent_command, true)
                .await
                .map_err(|e| SessionError::driver("launch-agent", format!("{} {}", draft.name, pane.role), e))?;
        }

        if let Some(editor) = &self.editor {
            if let Err(e) = editor.launch(&panes[0].working_directory) {
                warn!("Failed to launch editor for {}: {}", draft.name, e);
            }
        }

        self.driver
            .select_pane(&panes[0].multiplexer_pane_id)
            .await
            .map_err(|e| SessionError::driver("select-pane", format!("{} main", draft.name), e))?;

        let session = AgentSession {
            name: draft.name.to_string(),
            repository_root: draft.repository_root.to_path_buf(),
            layout: draft.plan.layout,
            multiplexer_session_handle: draft.handle.clone(),
            panes,
            created_at: draft.created_at,
        };

        self.store.create(&session)?;
        Ok(session)
    }

    /// Tear down a half-built session. Returns the error to report.
    async fn roll_back(&self, name: &str, handle: &SessionHandle, err: SessionError) -> SessionError {
        warn!("Spawn of {} failed, rolling back: {}", name, err);

        let rollback = self.driver.kill_session(handle).await;
        let entry = AuditEntry::new(
            AuditAction::SpawnRolledBack,
            AuditResult::Failed(err.to_string()),
            name,
        );

        match rollback {
            Ok(()) => {
                audit_log(&entry);
                err
            }
            Err(e) if e.is_not_found() => {
                audit_log(&entry.details("multiplexer session already gone"));
                err
            }
            Err(e) => {
                let failure = format!("kill-session {handle}: {e}");
                warn!("Rollback of {} incomplete: {}", name, failure);
                audit_log(&entry.details(failure.clone()));
                SessionError::RollbackIncomplete {
                    source: Box::new(err),
                    failures: vec![failure],
                }
            }
        }
    }

    /// Type `text` into one pane and submit it
    pub async fn send(&self, name: &str, role: PaneRole, text: &str) -> Result<(), SessionError> {
        let session = self.store.get(name)?;
        let pane = find_pane(&session, role)?;

        if let Err(e) = self.driver.send_keys(&pane.multiplexer_pane_id, text, true).await {
            return Err(self.pane_failure(&session, pane, "send-keys", e).await);
        }

        debug!("Sent {} bytes to {} {}", text.len(), name, role);
        Ok(())
    }

    /// Send `text` to every pane in session order, continuing past failures
    pub async fn broadcast(&self, name: &str, text: &str) -> Result<BroadcastReport, SessionError> {
        let session = self.store.get(name)?;
        let mut report = BroadcastReport::default();

        for pane in &session.panes {
            match self
                .driver
                .send_keys(&pane.multiplexer_pane_id, text, true)
                .await
            {
                Ok(()) => report.delivered.push(pane.role),
                Err(e) => {
                    warn!("Broadcast to {} {} failed: {}", name, pane.role, e);
                    report.failed.push((pane.role, e.to_string()));
                }
            }
        }

        info!(
            "Broadcast to {}: {} delivered, {} failed",
            name,
            report.delivered.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Bring the session, and optionally one pane, to the foreground
    pub async fn focus(&self, name: &str, role: Option<PaneRole>) -> Result<(), SessionError> {
        let session = self.store.get(name)?;

        if let Some(role) = role {
            let pane = find_pane(&session, role)?;
            if let Err(e) = self.driver.select_pane(&pane.multiplexer_pane_id).await {
                return Err(self.pane_failure(&session, pane, "select-pane", e).await);
            }
        }

        self.driver
            .attach_session(&session.multiplexer_session_handle)
            .await
            .map_err(|e| session_failure(&session, "attach-session", e))
    }

    /// Every stored session with per-pane liveness
    pub async fn list(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let sessions = self.store.list()?;
        let mut summaries = Vec::with_capacity(sessions.len());

        for session in sessions {
            let live = match self.driver.list_panes(&session.multiplexer_session_handle).await {
                Ok(panes) => panes,
                Err(e) if e.is_not_found() => {
                    debug!("Session {} has no live multiplexer session", session.name);
                    Vec::new()
                }
                Err(e) => return Err(SessionError::driver("list-panes", &session.name, e)),
            };

            summaries.push(summarize(&session, &live));
        }

        Ok(summaries)
    }

    /// Remove one secondary pane; `main` only goes away with the whole session
    pub async fn close(&self, name: &str, role: PaneRole) -> Result<AgentSession, SessionError> {
        let session = self.store.get(name)?;
        let pane = find_pane(&session, role)?;

        if session.panes.len() == 1 {
            return Err(SessionError::CannotCloseLastPane {
                session: name.to_string(),
                role,
            });
        }
        if role == PaneRole::Main {
            return Err(SessionError::CannotCloseMain(name.to_string()));
        }

        match self.driver.kill_pane(&pane.multiplexer_pane_id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                // The pane may have exited on its own; only a missing session is stale
                self.driver
                    .list_panes(&session.multiplexer_session_handle)
                    .await
                    .map_err(|e| session_failure(&session, "list-panes", e))?;
                warn!("Pane {} of {} was already gone", role, name);
            }
            Err(e) => return Err(self.pane_failure(&session, pane, "kill-pane", e).await),
        }

        let updated = self
            .store
            .update(name, &mut |record| record.panes.retain(|p| p.role != role))?;

        audit_log(
            &AuditEntry::new(AuditAction::PaneClosed, AuditResult::Success, name)
                .pane(role)
                .path(&pane.working_directory),
        );
        info!("Closed {} of {} ({} panes left)", role, name, updated.panes.len());
        Ok(updated)
    }

    /// Classify a failed pane command.
    ///
    /// A pane that no longer resolves is stale on its own while its session
    /// still runs, and takes the session record with it otherwise.
    async fn pane_failure(
        &self,
        session: &AgentSession,
        pane: &AgentPane,
        operation: &'static str,
        err: DriverError,
    ) -> SessionError {
        let message = match err {
            DriverError::NotFound(message) => message,
            other => {
                return SessionError::driver(
                    operation,
                    format!("{} {}", session.name, pane.role),
                    other,
                )
            }
        };

        match self.driver.list_panes(&session.multiplexer_session_handle).await {
            Err(e) if e.is_not_found() => SessionError::HandleStale {
                session: session.name.clone(),
                detail: message,
            },
            _ => SessionError::PaneStale {
                session: session.name.clone(),
                role: pane.role,
                detail: format!("{}: {}", pane.multiplexer_pane_id, message),
            },
        }
    }

    /// Remove the multiplexer session and the record. Safe to repeat.
    pub async fn kill(&self, name: &str) -> Result<KillOutcome, SessionError> {
        let session = match self.store.get(name) {
            Ok(session) => session,
            Err(StoreError::NotFound(_)) => {
                debug!("No record for {}, nothing to kill", name);
                return Ok(KillOutcome::NoRecord);
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = match self
            .driver
            .kill_session(&session.multiplexer_session_handle)
            .await
        {
            Ok(()) => KillOutcome::Killed,
            Err(e) if e.is_not_found() => {
                info!("Multiplexer session {} already gone", session.multiplexer_session_handle);
                KillOutcome::AlreadyGone
            }
            Err(e) => return Err(session_failure(&session, "kill-session", e)),
        };

        match self.store.delete(name) {
            Ok(()) | Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let details = match outcome {
            KillOutcome::AlreadyGone => "multiplexer session already gone",
            _ => "multiplexer session removed",
        };
        audit_log(
            &AuditEntry::new(AuditAction::SessionKilled, AuditResult::Success, name)
                .path(&session.repository_root)
                .details(details),
        );
        info!("Killed session {}", name);
        Ok(outcome)
    }
}

/// Inputs of one spawn once the multiplexer session exists
struct SessionDraft<'a> {
    name: &'a str,
    repository_root: &'a Path,
    handle: &'a SessionHandle,
    plan: &'a LayoutPlan,
    /// Index 0 binds `main`, index N binds `secondaryN`
    directories: &'a [PathBuf],
    created_at: DateTime<Utc>,
}

impl SessionDraft<'_> {
    fn directory_for(&self, role: PaneRole) -> Result<PathBuf, SessionError> {
        let index = match role {
            PaneRole::Main => 0,
            PaneRole::Secondary(n) => usize::from(n),
        };

        self.directories
            .get(index)
            .cloned()
            .ok_or(SessionError::InsufficientWorkspaces {
                requested: index + 1,
                available: self.directories.len(),
            })
    }
}

fn find_pane(session: &AgentSession, role: PaneRole) -> Result<&AgentPane, SessionError> {
    session.pane(role).ok_or_else(|| SessionError::PaneNotFound {
        session: session.name.clone(),
        role,
    })
}

fn session_failure(session: &AgentSession, operation: &'static str, err: DriverError) -> SessionError {
    match err {
        DriverError::NotFound(message) => SessionError::HandleStale {
            session: session.name.clone(),
            detail: message,
        },
        other => SessionError::driver(operation, &session.name, other),
    }
}

fn summarize(session: &AgentSession, live: &[PaneHandle]) -> SessionSummary {
    SessionSummary {
        name: session.name.clone(),
        repository_root: session.repository_root.clone(),
        layout: session.layout,
        state: session.state(),
        created_at: session.created_at,
        panes: session
            .panes
            .iter()
            .map(|pane| PaneSummary {
                role: pane.role,
                working_directory: pane.working_directory.clone(),
                pane_id: pane.multiplexer_pane_id.to_string(),
                live: live.contains(&pane.multiplexer_pane_id),
            })
            .collect(),
    }
}
