// ABOUTME: Behavioral tests for the file-backed session store
//
// Verifies records survive reopening the store, are keyed by session name,
// stay whole across updates, and that unreadable files do not hide good ones.

use agentmux::layout::Layout;
use agentmux::models::{AgentPane, AgentSession, PaneHandle, PaneRole, SessionHandle};
use agentmux::store::{FileSessionStore, SessionStore, StoreError};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper: a two-pane session record created at the given second
fn create_session(name: &str, second: u32) -> AgentSession {
    AgentSession {
        name: name.to_string(),
        repository_root: PathBuf::from("/path/to/repo"),
        layout: Layout::SideBySide,
        multiplexer_session_handle: SessionHandle::new(name),
        panes: vec![
            AgentPane::new(PaneRole::Main, PathBuf::from("/path/to/repo"), PaneHandle::new("%0")),
            AgentPane::new(
                PaneRole::Secondary(1),
                PathBuf::from("/path/to/wt-1"),
                PaneHandle::new("%1"),
            ),
        ],
        created_at: Utc.with_ymd_and_hms(2026, 1, 17, 18, 25, second).unwrap(),
    }
}

#[test]
fn test_records_survive_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    let session = create_session("agents-20260117-182546", 46);

    {
        let store = FileSessionStore::open(dir.path()).unwrap();
        store.create(&session).unwrap();
    }

    let reopened = FileSessionStore::open(dir.path()).unwrap();
    assert_eq!(reopened.get(&session.name).unwrap(), session);
    assert_eq!(reopened.list().unwrap(), vec![session]);
}

#[test]
fn test_record_format_is_named_json() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path()).unwrap();
    store.create(&create_session("agents-a", 1)).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("agents-a.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(json["name"], "agents-a");
    assert_eq!(json["layout"], "side-by-side");
    assert_eq!(json["multiplexer_session_handle"], "agents-a");
    assert_eq!(json["panes"][0]["role"], "main");
    assert_eq!(json["panes"][1]["role"], "secondary1");
    assert_eq!(json["panes"][1]["multiplexer_pane_id"], "%1");
}

#[test]
fn test_list_is_in_creation_order() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path()).unwrap();

    store.create(&create_session("agents-z", 3)).unwrap();
    store.create(&create_session("agents-a", 9)).unwrap();
    store.create(&create_session("agents-m", 1)).unwrap();

    let names: Vec<String> = store.list().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["agents-m", "agents-z", "agents-a"]);
}

#[test]
fn test_create_never_overwrites() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path()).unwrap();
    let original = create_session("agents-dup", 1);
    store.create(&original).unwrap();

    let mut other = create_session("agents-dup", 2);
    other.repository_root = PathBuf::from("/elsewhere");
    let err = store.create(&other).unwrap_err();

    assert!(matches!(err, StoreError::DuplicateSession(name) if name == "agents-dup"));
    assert_eq!(store.get("agents-dup").unwrap(), original);
}

#[test]
fn test_update_replaces_whole_record_and_persists() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path()).unwrap();
    store.create(&create_session("agents-u", 1)).unwrap();

    let updated = store
        .update("agents-u", &mut |session| {
            session.panes.retain(|pane| pane.role != PaneRole::Main);
        })
        .unwrap();
    assert_eq!(updated.panes.len(), 1);

    let reopened = FileSessionStore::open(dir.path()).unwrap();
    assert_eq!(reopened.get("agents-u").unwrap(), updated);

    // No staging files are left behind
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().and_then(|e| e.to_str()) != Some("json"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_missing_records_are_not_found() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path()).unwrap();

    assert!(matches!(store.get("agents-x"), Err(StoreError::NotFound(_))));
    assert!(matches!(store.delete("agents-x"), Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.update("agents-x", &mut |_| {}),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(store.get("../escape"), Err(StoreError::NotFound(_))));
}

#[test]
fn test_corrupt_record_does_not_hide_others() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path()).unwrap();
    store.create(&create_session("agents-ok", 1)).unwrap();
    std::fs::write(dir.path().join("agents-bad.json"), "{ not json").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let names: Vec<String> = store.list().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["agents-ok"]);
    assert!(matches!(store.get("agents-bad"), Err(StoreError::Corrupt { .. })));
}

#[test]
fn test_delete_removes_the_record() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path()).unwrap();
    store.create(&create_session("agents-d", 1)).unwrap();

    store.delete("agents-d").unwrap();
    assert!(!store.contains("agents-d").unwrap());
    assert!(!dir.path().join("agents-d.json").exists());
}
