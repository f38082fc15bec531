// ABOUTME: Behavioral tests for configuration loading
// Verifies a complete config file round-trips and feeds the session manager defaults

use agentmux::config::AppConfig;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test that default config has sensible values for immediate usability
#[test]
fn test_default_config_has_sensible_values() {
    let config = AppConfig::default();

    assert_eq!(config.agent.command, "claude");
    assert_eq!(config.session.prefix, "agents");
    assert!(
        (1..=4).contains(&config.session.default_agents),
        "default agent count must be a supported layout"
    );
    assert!(config.editor.command.is_none());
}

#[test]
fn test_full_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[agent]
command = "claude --dangerously-skip-permissions"

[editor]
command = "code --new-window"
launch_on_spawn = true

[tmux]
history_limit = 10000
mouse = false

[session]
prefix = "swarm"
default_agents = 4

[store]
dir = "/tmp/agentmux-store"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&path).unwrap();
    assert_eq!(config.agent.command, "claude --dangerously-skip-permissions");
    assert_eq!(config.editor.command.as_deref(), Some("code --new-window"));
    assert!(config.editor.launch_on_spawn);
    assert_eq!(config.tmux.history_limit, 10000);
    assert!(!config.tmux.mouse);
    assert_eq!(config.session.prefix, "swarm");
    assert_eq!(config.session.default_agents, 4);
    assert_eq!(config.store_dir().unwrap(), PathBuf::from("/tmp/agentmux-store"));
}

#[test]
fn test_config_serialization_roundtrip() {
    let mut config = AppConfig::default();
    config.session.prefix = "team".to_string();
    config.editor.command = Some("zed".to_string());

    let text = toml::to_string(&config).unwrap();
    let parsed: AppConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_unknown_sections_are_ignored() {
    let config: AppConfig = toml::from_str("[future]\nflag = true\n").unwrap();
    assert_eq!(config, AppConfig::default());
}
