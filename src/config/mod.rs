// ABOUTME: Configuration management for agentmux
// Handles the agent/editor commands, tmux session settings and store location

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the agentmux home directory
pub const HOME_ENV: &str = "AGENTMUX_HOME";

const CONFIG_FILE: &str = "config.toml";

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "agentmux=info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Agent process launched in every pane
    #[serde(default)]
    pub agent: AgentConfig,

    /// Companion editor for the main pane
    #[serde(default)]
    pub editor: EditorConfig,

    /// Tmux configuration
    #[serde(default)]
    pub tmux: TmuxConfig,

    /// Session naming and spawn defaults
    #[serde(default)]
    pub session: SessionDefaults,

    /// Session store location
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Command typed into each pane after it is created (default: "claude")
    #[serde(default = "default_agent_command")]
    pub command: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: default_agent_command(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EditorConfig {
    /// Editor executable; falls back to $EDITOR, then any installed editor
    #[serde(default)]
    pub command: Option<String>,

    /// Open the editor on the main working directory after every spawn
    #[serde(default)]
    pub launch_on_spawn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmuxConfig {
    /// Tmux history limit in lines (default: 50000)
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Enable mouse scrolling in tmux (default: true)
    #[serde(default = "default_true")]
    pub mouse: bool,
}

impl Default for TmuxConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            mouse: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDefaults {
    /// Prefix of generated session names (default: "agents")
    #[serde(default = "default_session_prefix")]
    pub prefix: String,

    /// Secondary agents spawned when --agents is omitted (default: 2)
    #[serde(default = "default_agents")]
    pub default_agents: usize,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            prefix: default_session_prefix(),
            default_agents: default_agents(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Directory holding one JSON record per session (default: <home>/sessions)
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_agent_command() -> String {
    "claude".to_string()
}

fn default_history_limit() -> u32 {
    50000
}

fn default_session_prefix() -> String {
    "agents".to_string()
}

fn default_agents() -> usize {
    2
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load `<home>/config.toml`, falling back to defaults when it is absent
    pub fn load() -> Result<Self> {
        Self::load_from(&home_dir()?.join(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Directory of the session store
    pub fn store_dir(&self) -> Result<PathBuf> {
        match &self.store.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(home_dir()?.join("sessions")),
        }
    }
}

/// `$AGENTMUX_HOME`, or `~/.agentmux`
pub fn home_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".agentmux"))
}

/// Directory for JSONL logs and the audit trail
pub fn logs_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join("logs"))
}
