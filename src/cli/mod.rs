// ABOUTME: CLI argument parsing and command routing for agentmux
//
// Provides command-line interface for:
// - Spawning agent sessions (spawn)
// - Talking to agents (send, broadcast)
// - Navigating sessions (focus, list)
// - Tearing down panes and sessions (close, kill)

pub mod focus;
pub mod list;
pub mod send;
pub mod spawn;
pub mod teardown;
pub mod util;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::models::PaneRole;
use crate::session::{SessionError, EXIT_PARTIAL_BROADCAST};

pub use send::PartialBroadcast;

/// Spawn and drive groups of coding agents in tmux panes
#[derive(Parser)]
#[command(name = "agentmux")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for commands
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Spawn a main agent plus N secondaries in a new tmux session
    Spawn(SpawnArgs),

    /// Send text to one pane and submit it
    Send(SendArgs),

    /// Send text to every pane of a session
    Broadcast(BroadcastArgs),

    /// Bring a session (and optionally one pane) to the foreground
    Focus(FocusArgs),

    /// List sessions with pane liveness
    List,

    /// Close one secondary pane of a session (use kill to end main)
    Close(CloseArgs),

    /// Kill a session and forget it
    Kill(KillArgs),
}

/// Arguments for the spawn command
#[derive(clap::Args)]
pub struct SpawnArgs {
    /// Number of secondary agents (1-4, default from config)
    #[arg(long, short = 'n')]
    pub agents: Option<usize>,

    /// Label appended to the session name
    #[arg(long, short)]
    pub label: Option<String>,

    /// Do not attach to the session after creating it
    #[arg(long)]
    pub no_attach: bool,

    /// Repository to spawn against (default: current directory)
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Open the companion editor on the main pane's directory
    #[arg(long)]
    pub editor: bool,
}

/// Arguments for the send command
#[derive(clap::Args)]
pub struct SendArgs {
    /// Session name or unique prefix
    pub session: String,

    /// Pane role: main or secondaryN
    pub role: PaneRole,

    /// Text to type into the pane
    pub text: String,
}

/// Arguments for the broadcast command
#[derive(clap::Args)]
pub struct BroadcastArgs {
    /// Session name or unique prefix
    pub session: String,

    /// Text to type into every pane
    pub text: String,
}

/// Arguments for the focus command
#[derive(clap::Args)]
pub struct FocusArgs {
    /// Session name or unique prefix
    pub session: String,

    /// Pane to select before attaching
    pub role: Option<PaneRole>,
}

/// Arguments for the close command
#[derive(clap::Args)]
pub struct CloseArgs {
    /// Session name or unique prefix
    pub session: String,

    /// Pane role to close
    pub role: PaneRole,
}

/// Arguments for the kill command
#[derive(clap::Args)]
pub struct KillArgs {
    /// Session name or unique prefix
    pub session: String,
}

/// Run one parsed command
pub async fn dispatch(cli: Cli, config: &AppConfig) -> Result<()> {
    match cli.command {
        Commands::Spawn(args) => spawn::execute(args, config, cli.format).await,
        Commands::Send(args) => send::execute_send(args, config).await,
        Commands::Broadcast(args) => send::execute_broadcast(args, config, cli.format).await,
        Commands::Focus(args) => focus::execute(args, config).await,
        Commands::List => list::execute(config, cli.format).await,
        Commands::Close(args) => teardown::execute_close(args, config, cli.format).await,
        Commands::Kill(args) => teardown::execute_kill(args, config, cli.format).await,
    }
}

/// Process exit code for a failed command
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(session_err) = err.downcast_ref::<SessionError>() {
        return session_err.exit_code();
    }

    if err.downcast_ref::<PartialBroadcast>().is_some() {
        return EXIT_PARTIAL_BROADCAST;
    }

    1
}
