// ABOUTME: Git integration module - binds agents to isolated worktrees of a repository

pub mod worktree_binder;

pub use worktree_binder::{BindError, GitWorktreeBinder, WorkspaceBinder};

#[cfg(test)]
pub use worktree_binder::MockWorkspaceBinder;
