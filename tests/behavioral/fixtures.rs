// ABOUTME: Shared test fixtures and utilities for behavioral tests
//
// Provides:
// - FakeDriver: in-memory multiplexer recording every call, with injectable failures
// - StaticBinder: workspace binder handing out fixed directories
// - TestRepo: Temporary git repository for testing
// - tmux_available(): Check if tmux is installed
// - require_tmux!(): Skip test if tmux unavailable

use anyhow::Result;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

use agentmux::git::{BindError, WorkspaceBinder};
use agentmux::layout::Orientation;
use agentmux::models::{PaneHandle, SessionHandle};
use agentmux::session::SessionManager;
use agentmux::store::FileSessionStore;
use agentmux::tmux::{DriverError, MultiplexerDriver};

/// One recorded driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateSession { name: String, dir: PathBuf },
    Split { target: String, orientation: Orientation, ratio: u8, dir: PathBuf },
    SelectPane(String),
    SendKeys { pane: String, text: String, submit: bool },
    KillPane(String),
    KillSession(String),
    ListPanes(String),
    Attach(String),
}

#[derive(Debug, Default)]
pub struct FakeState {
    next_pane: u32,
    /// Live sessions and their panes in creation order
    pub sessions: BTreeMap<String, Vec<String>>,
    pub calls: Vec<Call>,
    /// Fail the Nth split (1-based)
    pub fail_split_at: Option<usize>,
    splits: usize,
    /// Pane ids whose send-keys fails
    pub fail_send_on: HashSet<String>,
    pub unavailable: bool,
}

/// In-memory multiplexer that behaves like tmux for the calls the manager makes
#[derive(Debug, Default)]
pub struct FakeDriver {
    state: Mutex<FakeState>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Text delivered to a pane, excluding the agent launch
    pub fn sent_to(&self, pane: &str) -> Vec<(String, bool)> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::SendKeys { pane: p, text, submit } if p == pane && text != AGENT_COMMAND => {
                    Some((text.clone(), *submit))
                }
                _ => None,
            })
            .collect()
    }

    pub fn live_panes(&self, session: &str) -> Vec<String> {
        self.state().sessions.get(session).cloned().unwrap_or_default()
    }

    pub fn session_exists(&self, session: &str) -> bool {
        self.state().sessions.contains_key(session)
    }

    /// Simulate a tmux server restart
    pub fn forget_everything(&self) {
        self.state().sessions.clear();
    }

    fn record(&self, call: Call) -> Result<MutexGuard<'_, FakeState>, DriverError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(DriverError::Unavailable("tmux is not installed or not on PATH".into()));
        }
        state.calls.push(call);
        Ok(state)
    }
}

fn not_found(what: &str) -> DriverError {
    DriverError::NotFound(format!("can't find {what}"))
}

fn owning_session<'a>(state: &'a mut FakeState, pane: &str) -> Option<&'a mut Vec<String>> {
    state
        .sessions
        .values_mut()
        .find(|panes| panes.iter().any(|p| p == pane))
}

impl MultiplexerDriver for FakeDriver {
    async fn create_detached_session(
        &self,
        name: &str,
        working_dir: &Path,
    ) -> Result<SessionHandle, DriverError> {
        let mut state = self.record(Call::CreateSession {
            name: name.to_string(),
            dir: working_dir.to_path_buf(),
        })?;

        if state.sessions.contains_key(name) {
            return Err(DriverError::CommandFailed {
                command: "new-session".into(),
                message: format!("duplicate session: {name}"),
            });
        }

        let pane = format!("%{}", state.next_pane);
        state.next_pane += 1;
        state.sessions.insert(name.to_string(), vec![pane]);
        Ok(SessionHandle::new(name))
    }

    async fn split(
        &self,
        target: &PaneHandle,
        orientation: Orientation,
        ratio: u8,
        working_dir: &Path,
    ) -> Result<PaneHandle, DriverError> {
        let mut state = self.record(Call::Split {
            target: target.to_string(),
            orientation,
            ratio,
            dir: working_dir.to_path_buf(),
        })?;

        state.splits += 1;
        if state.fail_split_at == Some(state.splits) {
            return Err(DriverError::CommandFailed {
                command: "split-window".into(),
                message: "no space for new pane".into(),
            });
        }

        let pane = format!("%{}", state.next_pane);
        state.next_pane += 1;
        owning_session(&mut state, target.as_str())
            .ok_or_else(|| not_found(&format!("pane: {target}")))?
            .push(pane.clone());
        Ok(PaneHandle::new(pane))
    }

    async fn select_pane(&self, pane: &PaneHandle) -> Result<(), DriverError> {
        let mut state = self.record(Call::SelectPane(pane.to_string()))?;
        owning_session(&mut state, pane.as_str())
            .map(|_| ())
            .ok_or_else(|| not_found(&format!("pane: {pane}")))
    }

    async fn send_keys(&self, pane: &PaneHandle, text: &str, submit: bool) -> Result<(), DriverError> {
        let mut state = self.record(Call::SendKeys {
            pane: pane.to_string(),
            text: text.to_string(),
            submit,
        })?;

        if state.fail_send_on.contains(pane.as_str()) {
            return Err(DriverError::CommandFailed {
                command: "send-keys".into(),
                message: format!("pane {pane} is dead"),
            });
        }

        owning_session(&mut state, pane.as_str())
            .map(|_| ())
            .ok_or_else(|| not_found(&format!("pane: {pane}")))
    }

    async fn kill_pane(&self, pane: &PaneHandle) -> Result<(), DriverError> {
        let mut state = self.record(Call::KillPane(pane.to_string()))?;
        let panes = owning_session(&mut state, pane.as_str())
            .ok_or_else(|| not_found(&format!("pane: {pane}")))?;
        panes.retain(|p| p != pane.as_str());
        Ok(())
    }

    async fn kill_session(&self, session: &SessionHandle) -> Result<(), DriverError> {
        let mut state = self.record(Call::KillSession(session.to_string()))?;
        state
            .sessions
            .remove(session.as_str())
            .map(|_| ())
            .ok_or_else(|| not_found(&format!("session: {session}")))
    }

    async fn list_panes(&self, session: &SessionHandle) -> Result<Vec<PaneHandle>, DriverError> {
        let state = self.record(Call::ListPanes(session.to_string()))?;
        state
            .sessions
            .get(session.as_str())
            .map(|panes| panes.iter().cloned().map(PaneHandle::new).collect())
            .ok_or_else(|| not_found(&format!("session: {session}")))
    }

    async fn attach_session(&self, session: &SessionHandle) -> Result<(), DriverError> {
        let state = self.record(Call::Attach(session.to_string()))?;
        if state.sessions.contains_key(session.as_str()) {
            Ok(())
        } else {
            Err(not_found(&format!("session: {session}")))
        }
    }
}

/// Binder returning `<root>/wt-<i>` for every requested slot, up to a limit
#[derive(Debug, Clone)]
pub struct StaticBinder {
    pub available: usize,
}

impl StaticBinder {
    pub const fn new(available: usize) -> Self {
        Self { available }
    }
}

impl WorkspaceBinder for StaticBinder {
    fn bind(&self, repository_root: &Path, count: usize) -> Result<Vec<PathBuf>, BindError> {
        if count > self.available {
            return Err(BindError::InsufficientWorkspaces {
                requested: count,
                available: self.available,
            });
        }
        Ok((0..count)
            .map(|i| repository_root.join(format!("wt-{i}")))
            .collect())
    }
}

pub const AGENT_COMMAND: &str = "claude --continue";

pub type TestManager = SessionManager<FakeDriver, FileSessionStore, StaticBinder>;

/// Manager over a fake driver and a file store in a temporary directory
pub fn test_manager(available_workspaces: usize) -> Result<(TempDir, TestManager)> {
    let dir = TempDir::new()?;
    let store = FileSessionStore::open(dir.path().join("sessions"))?;
    let manager = SessionManager::new(
        FakeDriver::new(),
        store,
        StaticBinder::new(available_workspaces),
    )
    .with_agent_command(AGENT_COMMAND);
    Ok((dir, manager))
}

/// Creates a temporary git repository with initial commit
pub struct TestRepo {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    /// Create a new temporary git repository with initial commit
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("repo");
        std::fs::create_dir_all(&path)?;

        git(&path, &["init"])?;
        git(&path, &["config", "user.email", "test@test.com"])?;
        git(&path, &["config", "user.name", "Test User"])?;

        // Create initial file and commit
        std::fs::write(path.join("README.md"), "# Test Repo\n")?;
        git(&path, &["add", "."])?;
        git(&path, &["commit", "-m", "Initial commit"])?;

        Ok(Self { dir, path })
    }

    /// Get the path to the repository
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a linked worktree on a new branch next to the repository
    pub fn add_worktree(&self, name: &str) -> Result<PathBuf> {
        let worktree = self.dir.path().join(name);
        let worktree_arg = worktree.to_string_lossy().into_owned();
        git(&self.path, &["worktree", "add", "-b", name, &worktree_arg])?;
        Ok(worktree.canonicalize()?)
    }
}

fn git(dir: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// Check if tmux is available on the system
pub fn tmux_available() -> bool {
    Command::new("tmux")
        .args(["-V"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Macro to skip test if tmux is not available
#[macro_export]
macro_rules! require_tmux {
    () => {
        if !super::fixtures::tmux_available() {
            eprintln!("Skipping test: tmux not available");
            return Ok(());
        }
    };
}

/// Helper to clean up a tmux session by name
pub fn cleanup_tmux_session(name: &str) {
    let _ = Command::new("tmux")
        .args(["kill-session", "-t", &format!("={name}")])
        .output();
}

/// Check if a tmux session exists
pub fn tmux_session_exists(name: &str) -> bool {
    Command::new("tmux")
        .args(["has-session", "-t", &format!("={name}")])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Capture tmux pane content
pub fn capture_tmux_pane(target: &str) -> Result<String> {
    let output = Command::new("tmux")
        .args(["capture-pane", "-t", target, "-p"])
        .output()?;

    Ok(String::from_utf8(output.stdout)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_creation() -> Result<()> {
        let repo = TestRepo::new()?;
        assert!(repo.path().exists());
        assert!(repo.path().join(".git").exists());
        assert!(repo.path().join("README.md").exists());
        Ok(())
    }

    #[test]
    fn test_static_binder_limits() {
        let binder = StaticBinder::new(2);
        assert_eq!(binder.bind(Path::new("/r"), 2).unwrap().len(), 2);
        assert!(binder.bind(Path::new("/r"), 3).is_err());
    }

    #[tokio::test]
    async fn test_fake_driver_tracks_panes() {
        let driver = FakeDriver::new();
        let session = driver
            .create_detached_session("s", Path::new("/tmp"))
            .await
            .unwrap();
        let main = driver.list_panes(&session).await.unwrap().remove(0);
        let second = driver
            .split(&main, Orientation::Vertical, 50, Path::new("/tmp"))
            .await
            .unwrap();

        assert_eq!(driver.live_panes("s"), vec![main.to_string(), second.to_string()]);
        driver.kill_session(&session).await.unwrap();
        assert!(driver.kill_session(&session).await.unwrap_err().is_not_found());
    }
}
