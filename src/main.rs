// ABOUTME: Main entry point for agentmux
//
// Binary: agentmux
// Usage: agentmux <COMMAND>
// - spawn: create a tmux session with a main agent and 1-4 secondaries
// - send / broadcast: type a message into one pane or all of them
// - focus: attach to a session, optionally selecting a pane
// - list: show sessions and pane liveness
// - close / kill: remove a pane or the whole session

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use agentmux::audit::AuditLogger;
use agentmux::cli;
use agentmux::config::{self, AppConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    setup_logging();
    setup_panic_handler();
    setup_audit();

    let result = match AppConfig::load() {
        Ok(config) => cli::dispatch(args, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::from(cli::exit_code(&e))
        }
    }
}

fn setup_logging() {
    use std::fs::OpenOptions;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_file = config::logs_dir().ok().and_then(|log_dir| {
        std::fs::create_dir_all(&log_dir).ok()?;

        // Create JSONL log file with timestamp
        let path = log_dir.join(format!(
            "agentmux-{}.jsonl",
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        ));
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match log_file {
        Some(file) => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json() // Output in JSON Lines format
                    .with_target(true)
                    .with_writer(file)
                    .with_ansi(false),
            )
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.into()))
            .init(),
        None => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .with(EnvFilter::new("warn"))
            .init(),
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Application panicked: {}", panic_info);
        eprintln!("Application panicked: {}", panic_info);
        eprintln!("Please check the logs for more details.");
    }));
}

fn setup_audit() {
    let Ok(log_dir) = config::logs_dir() else {
        return;
    };

    let path = AuditLogger::default_path(&log_dir);
    match AuditLogger::init(&path) {
        Ok(()) => info!("Audit trail at {}", path.display()),
        Err(e) => tracing::warn!("Audit trail disabled: {}", e),
    }
}
