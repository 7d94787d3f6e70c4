//! Tests for StateManager

use super::*;
use crate::error::Error;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.input().is_none());
    assert!(manager.current().is_none());
    assert_eq!(manager.value().unwrap(), json!({}));
}

#[test]
fn test_from_json() {
    let manager = StateManager::from_json(r#"{"bookmarks": {"tasks": "x"}}"#).unwrap();
    assert_eq!(manager.input(), Some(&json!({"bookmarks": {"tasks": "x"}})));
    // Input state is reported until a checkpoint replaces it
    assert_eq!(manager.value().unwrap(), json!({"bookmarks": {"tasks": "x"}}));
}

#[test]
fn test_from_json_empty() {
    let manager = StateManager::from_json("  \n").unwrap();
    assert!(manager.input().is_none());
}

#[test]
fn test_from_json_invalid() {
    let err = StateManager::from_json("{not json").unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

#[test]
fn test_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{"last_updated_at": "2024-01-01T00:00:00Z", "stream": "tasks"}"#)
        .unwrap();

    let manager = StateManager::from_file(&path).unwrap();
    assert_eq!(manager.input().unwrap()["stream"], "tasks");
}

#[test]
fn test_from_file_missing() {
    let dir = tempdir().unwrap();
    let err = StateManager::from_file(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

// ============================================================================
// Checkpoint Tests
// ============================================================================

#[test]
fn test_checkpoint_overwrites() {
    let mut manager = StateManager::from_json(r#"{"old": true}"#).unwrap();

    manager.checkpoint("tasks");
    assert_eq!(manager.current().unwrap().stream, "tasks");

    manager.checkpoint("folders");
    let value = manager.value().unwrap();
    assert_eq!(value["stream"], "folders");
    assert!(value.get("old").is_none());
    assert_eq!(value.as_object().unwrap().len(), 2);
}

#[test]
fn test_checkpoint_format() {
    let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
    let checkpoint = Checkpoint::new("tasks", at);
    assert_eq!(
        serde_json::to_value(&checkpoint).unwrap(),
        json!({"last_updated_at": "2024-05-06T07:08:09Z", "stream": "tasks"})
    );
}

#[test]
fn test_checkpoint_now_is_rfc3339() {
    let checkpoint = Checkpoint::now("tasks");
    assert!(chrono::DateTime::parse_from_rfc3339(&checkpoint.last_updated_at).is_ok());
}
