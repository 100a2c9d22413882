//! Integration tests for the coordinator facade.

use std::sync::Arc;

use repl_coordinator::launcher::{DisplaySurface, ProcessLauncher};
use repl_coordinator::models::environment::ToolName;
use repl_coordinator::models::session::SessionState;
use repl_coordinator::{AppError, Coordinator};

use super::test_helpers::{fast_config, workspace, CountingSurface, MockLauncher};

fn coordinator(launcher: &Arc<MockLauncher>) -> Coordinator {
    Coordinator::new(
        fast_config(),
        Arc::clone(launcher) as Arc<dyn ProcessLauncher>,
        Arc::new(CountingSurface::default()) as Arc<dyn DisplaySurface>,
    )
}

// ── run_in_session ───────────────────────────────────────────

#[tokio::test]
async fn run_in_session_creates_loads_and_evaluates() {
    let launcher = MockLauncher::all_tools();
    let coordinator = coordinator(&launcher);

    coordinator
        .run_in_session("/ws", "A.src", "main")
        .await
        .expect("run");

    let lines = launcher.last_transcript().lines();
    assert_eq!(lines, vec![":load \"A.src\"", "main"]);

    let session = coordinator
        .registry()
        .get(&workspace("/ws"))
        .await
        .expect("session registered");
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(
        session.loaded_modules().await.into_iter().collect::<Vec<_>>(),
        vec!["A.src".to_owned()]
    );
}

#[tokio::test]
async fn run_in_session_reuses_the_workspace_session() {
    let launcher = MockLauncher::all_tools();
    let coordinator = coordinator(&launcher);

    coordinator
        .run_in_session("/ws", "A.src", "main")
        .await
        .expect("first run");
    coordinator
        .run_in_session("/ws", "B.src", "other")
        .await
        .expect("second run");

    assert_eq!(launcher.spawn_calls(), 1);
    let session = coordinator
        .registry()
        .get(&workspace("/ws"))
        .await
        .expect("session");
    assert_eq!(session.loaded_modules().await.len(), 2);
}

#[tokio::test]
async fn run_in_session_recovers_once_from_a_disposed_session() {
    let launcher = MockLauncher::all_tools();
    let coordinator = coordinator(&launcher);
    let ws = workspace("/ws");

    let session = coordinator
        .registry()
        .get_or_create(&ws)
        .await
        .expect("create");
    session.dispose().await;

    coordinator
        .run_in_session("/ws", "A.src", "main")
        .await
        .expect("recovered run");

    assert_eq!(launcher.spawn_calls(), 2);
    assert_eq!(launcher.last_transcript().lines(), vec![":load \"A.src\"", "main"]);
}

#[tokio::test]
async fn run_in_session_rejects_relative_paths() {
    let launcher = MockLauncher::all_tools();
    let coordinator = coordinator(&launcher);

    let result = coordinator.run_in_session("relative/ws", "A.src", "main").await;
    assert!(matches!(result, Err(AppError::Workspace(_))));
}

// ── Environment facade ───────────────────────────────────────

#[tokio::test]
async fn ensure_environment_reports_validity_and_missing_detail() {
    let launcher = MockLauncher::with_tools(&[
        ("ghci", "/usr/bin/ghci"),
        ("runghc", "/usr/bin/runghc"),
    ]);
    let coordinator = coordinator(&launcher);

    assert!(coordinator.ensure_environment("/ws").await.expect("validate"));
    assert_eq!(coordinator.missing_tools().await, vec![ToolName::BuildTool]);
}

#[tokio::test]
async fn ensure_environment_false_when_tools_missing() {
    let launcher = MockLauncher::with_tools(&[]);
    let coordinator = coordinator(&launcher);

    assert!(!coordinator.ensure_environment("/ws").await.expect("validate"));
    assert_eq!(
        coordinator.missing_tools().await,
        vec![
            ToolName::Interpreter,
            ToolName::ScriptRunner,
            ToolName::BuildTool
        ]
    );
}

#[tokio::test]
async fn restart_session_drops_cached_environment_record() {
    let launcher = MockLauncher::all_tools();
    let coordinator = coordinator(&launcher);

    coordinator.ensure_environment("/ws").await.expect("validate");
    coordinator.ensure_environment("/ws").await.expect("cached");
    assert_eq!(launcher.probe_calls(), 3);

    coordinator.restart_session("/ws").await.expect("restart");

    coordinator.ensure_environment("/ws").await.expect("revalidate");
    assert_eq!(launcher.probe_calls(), 6, "restart must invalidate the cache");
}

// ── Lifecycle passthroughs ───────────────────────────────────

#[tokio::test]
async fn restart_session_yields_fresh_state() {
    let launcher = MockLauncher::all_tools();
    let coordinator = coordinator(&launcher);
    let ws = workspace("/ws");

    coordinator
        .run_in_session("/ws", "A.src", "main")
        .await
        .expect("run");
    let old = coordinator.registry().get(&ws).await.expect("old session");

    coordinator.restart_session("/ws").await.expect("restart");

    let fresh = coordinator.registry().get(&ws).await.expect("fresh session");
    assert_ne!(old.id(), fresh.id());
    assert!(fresh.loaded_modules().await.is_empty());
    assert_eq!(old.state(), SessionState::Disposed);
}

#[tokio::test]
async fn clear_session_passthrough_sends_directives() {
    let launcher = MockLauncher::all_tools();
    let coordinator = coordinator(&launcher);

    coordinator
        .run_in_session("/ws", "A.src", "main")
        .await
        .expect("run");
    coordinator.clear_session("/ws").await.expect("clear");

    let lines = launcher.last_transcript().lines();
    assert_eq!(lines, vec![":load \"A.src\"", "main", ":!clear", ":reload"]);
}

#[tokio::test]
async fn shutdown_disposes_sessions_and_clears_cache() {
    let launcher = MockLauncher::all_tools();
    let coordinator = coordinator(&launcher);

    coordinator.ensure_environment("/ws1").await.expect("validate");
    coordinator
        .run_in_session("/ws1", "A.src", "main")
        .await
        .expect("ws1 run");
    coordinator
        .run_in_session("/ws2", "B.src", "other")
        .await
        .expect("ws2 run");
    assert_eq!(coordinator.registry().session_count().await, 2);

    coordinator.shutdown().await;

    assert_eq!(coordinator.registry().session_count().await, 0);
    assert!(
        coordinator.detector().cached(&workspace("/ws1")).is_none(),
        "shutdown must drop cached environment records"
    );
}
