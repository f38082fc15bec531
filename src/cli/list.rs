// ABOUTME: CLI list command - list all sessions with pane liveness
//
// Reads every record from the session store and probes tmux for each one.
// Shows: session name, layout, state, live panes, creation time

use anyhow::Result;

use super::util::{build_manager, truncate};
use super::OutputFormat;
use crate::config::AppConfig;
use crate::session::SessionSummary;

/// Session status as displayed in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveStatus {
    /// Every recorded pane resolves
    Live,
    /// Some recorded panes are gone
    Degraded,
    /// No recorded pane resolves
    Stopped,
}

impl LiveStatus {
    #[must_use]
    pub fn of(summary: &SessionSummary) -> Self {
        match summary.live_panes() {
            0 => Self::Stopped,
            n if n == summary.panes.len() => Self::Live,
            _ => Self::Degraded,
        }
    }

    /// Get the display icon for this status
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Live => "\u{25cf} Live",         // filled circle
            Self::Degraded => "\u{25d0} Degraded", // half circle
            Self::Stopped => "\u{23f8} Stopped",   // pause icon
        }
    }
}

/// Execute the list command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<()> {
    let manager = build_manager(config)?;
    let sessions = manager.list().await?;

    match format {
        OutputFormat::Json => output_json(&sessions)?,
        OutputFormat::Text => output_text(&sessions),
    }

    Ok(())
}

/// Output sessions as JSON
fn output_json(sessions: &[SessionSummary]) -> Result<()> {
    let json = serde_json::to_string_pretty(sessions)?;
    println!("{json}");
    Ok(())
}

/// Output sessions as a text table
fn output_text(sessions: &[SessionSummary]) {
    if sessions.is_empty() {
        println!("No sessions found.");
        return;
    }

    println!(
        "{:<40} {:<18} {:<12} {:<7} CREATED",
        "SESSION", "LAYOUT", "STATUS", "PANES"
    );
    println!("{}", "-".repeat(100));

    for session in sessions {
        let panes = format!("{}/{}", session.live_panes(), session.panes.len());
        println!(
            "{:<40} {:<18} {:<12} {:<7} {}",
            truncate(&session.name, 40),
            session.layout.id(),
            LiveStatus::of(session).icon(),
            panes,
            session.created_at.format("%Y-%m-%d %H:%M:%S")
        );

        for pane in &session.panes {
            let mark = if pane.live { "live" } else { "gone" };
            println!(
                "    {:<11} {:<5} {:<4} {}",
                pane.role.to_string(),
                pane.pane_id,
                mark,
                pane.working_directory.display()
            );
        }
    }
}
