//! Unit tests for the session state model.

use repl_coordinator::models::session::SessionState;

#[test]
fn only_disposed_is_terminal() {
    assert!(SessionState::Disposed.is_terminal());
    assert!(!SessionState::Idle.is_terminal());
    assert!(!SessionState::Busy.is_terminal());
}

#[test]
fn states_display_lowercase_names() {
    assert_eq!(SessionState::Idle.to_string(), "idle");
    assert_eq!(SessionState::Busy.to_string(), "busy");
    assert_eq!(SessionState::Disposed.to_string(), "disposed");
}

#[test]
fn states_serialize_snake_case() {
    let json = serde_json::to_string(&SessionState::Idle).expect("serialize");
    assert_eq!(json, "\"idle\"");
}

#[test]
fn states_round_trip_through_serde() {
    let json = serde_json::to_string(&SessionState::Busy).expect("serialize");
    let state: SessionState = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(state, SessionState::Busy);
}
