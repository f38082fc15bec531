// ABOUTME: Binds agents to isolated working directories taken from a repository's git worktrees

use git2::Repository;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("insufficient workspaces: {requested} requested, {available} available")]
    InsufficientWorkspaces { requested: usize, available: usize },

    #[error("cannot read repository at {path}: {message}")]
    Repository { path: PathBuf, message: String },
}

impl BindError {
    fn repository(path: &Path, err: &git2::Error) -> Self {
        Self::Repository {
            path: path.to_path_buf(),
            message: err.message().to_string(),
        }
    }
}

/// Source of isolated working directories for agents.
#[cfg_attr(test, mockall::automock)]
pub trait WorkspaceBinder {
    /// Exactly `count` distinct directories, in binding order
    fn bind(&self, repository_root: &Path, count: usize) -> Result<Vec<PathBuf>, BindError>;
}

/// Uses the repository's own working tree plus its linked worktrees.
///
/// The directory the operator spawned from comes first; the rest follow
/// the main working tree and then linked worktrees sorted by path.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitWorktreeBinder;

impl GitWorktreeBinder {
    pub const fn new() -> Self {
        Self
    }

    /// Every usable working directory of the repository containing `root`
    pub fn candidates(&self, root: &Path) -> Result<Vec<PathBuf>, BindError> {
        let repo = Repository::open(root).map_err(|e| BindError::repository(root, &e))?;

        // Always enumerate from the main repository so a linked worktree root sees its siblings
        let common = if repo.is_worktree() {
            let main_git_dir = common_dir(repo.path());
            Repository::open(&main_git_dir).map_err(|e| BindError::repository(root, &e))?
        } else {
            repo
        };

        let mut linked = Vec::new();
        let names = common.worktrees().map_err(|e| BindError::repository(root, &e))?;
        for name in names.iter().flatten() {
            let worktree = common
                .find_worktree(name)
                .map_err(|e| BindError::repository(root, &e))?;

            if let Err(e) = worktree.validate() {
                debug!("Skipping invalid worktree '{}': {}", name, e.message());
                continue;
            }
            linked.push(canonical(worktree.path()));
        }
        linked.sort();

        let mut candidates: Vec<PathBuf> = common.workdir().map(canonical).into_iter().collect();
        candidates.extend(linked);
        candidates.dedup();

        let root = canonical(root);
        if let Some(index) = candidates.iter().position(|path| *path == root) {
            let spawn_root = candidates.remove(index);
            candidates.insert(0, spawn_root);
        }

        Ok(candidates)
    }
}

impl WorkspaceBinder for GitWorktreeBinder {
    fn bind(&self, repository_root: &Path, count: usize) -> Result<Vec<PathBuf>, BindError> {
        let mut candidates = self.candidates(repository_root)?;

        if candidates.len() < count {
            return Err(BindError::InsufficientWorkspaces {
                requested: count,
                available: candidates.len(),
            });
        }

        candidates.truncate(count);
        info!(
            "Bound {} workspaces under {}",
            candidates.len(),
            repository_root.display()
        );
        Ok(candidates)
    }
}

/// The shared git dir of a linked worktree's private git dir.
///
/// A linked worktree's git dir is `<common>/worktrees/<name>` and records the
/// relative way back in its `commondir` file.
fn common_dir(worktree_git_dir: &Path) -> PathBuf {
    match std::fs::read_to_string(worktree_git_dir.join("commondir")) {
        Ok(contents) => canonical(&worktree_git_dir.join(contents.trim())),
        Err(e) => {
            debug!(
                "No commondir file in {}: {}",
                worktree_git_dir.display(),
                e
            );
            worktree_git_dir
                .parent()
                .and_then(Path::parent)
                .map_or_else(|| worktree_git_dir.to_path_buf(), canonical)
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
