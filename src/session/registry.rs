//! One-session-per-workspace registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::CoordinatorConfig;
use crate::launcher::{DisplaySurface, ProcessLauncher};
use crate::models::workspace::WorkspaceKey;
use crate::session::repl::ReplSession;
use crate::Result;

/// Owns the mapping from workspace identity to live session.
///
/// The table is the only writer of session lifecycles: sessions are created
/// on demand, disposed sessions are evicted on lookup, and restart disposes
/// before recreating. The table lock guards map access only; spawning and
/// disposing happen under a per-workspace creation guard instead, so one
/// workspace's slow launch or teardown never holds up another's.
pub struct SessionRegistry {
    config: Arc<CoordinatorConfig>,
    launcher: Arc<dyn ProcessLauncher>,
    display: Arc<dyn DisplaySurface>,
    table: tokio::sync::Mutex<HashMap<WorkspaceKey, Arc<ReplSession>>>,
    guards: parking_lot::Mutex<HashMap<WorkspaceKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionRegistry {
    /// Build an empty registry over the given collaborators.
    #[must_use]
    pub fn new(
        config: Arc<CoordinatorConfig>,
        launcher: Arc<dyn ProcessLauncher>,
        display: Arc<dyn DisplaySurface>,
    ) -> Self {
        Self {
            config,
            launcher,
            display,
            table: tokio::sync::Mutex::new(HashMap::new()),
            guards: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Return the live session for a workspace, creating and starting one
    /// if none exists. A disposed session is never returned; it is evicted
    /// and replaced by a fresh one.
    ///
    /// Concurrent callers for the same workspace converge on a single
    /// spawn: late callers wait on the workspace's creation guard and then
    /// find the session the first caller registered.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Launch` if a fresh session's process cannot be
    /// started.
    pub async fn get_or_create(&self, workspace: &WorkspaceKey) -> Result<Arc<ReplSession>> {
        if let Some(existing) = self.live(workspace).await {
            return Ok(existing);
        }

        let guard = self.creation_guard(workspace);
        let _creating = guard.lock().await;

        // Another caller may have created the session while this one
        // waited on the guard.
        {
            let mut table = self.table.lock().await;
            if let Some(existing) = table.get(workspace) {
                if !existing.is_disposed() {
                    return Ok(Arc::clone(existing));
                }
                table.remove(workspace);
            }
        }

        let session = self.start_session(workspace).await?;
        self.table
            .lock()
            .await
            .insert(workspace.clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Dispose the current session for a workspace (if any) and start a
    /// fresh one. The caller always observes a newly started session with
    /// an empty loaded-module set.
    ///
    /// The old session is removed from the table before its teardown, so
    /// no lookup can hand it out while it shuts down; teardown and the
    /// fresh launch hold only the workspace's own creation guard.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Launch` if the fresh session's process cannot be
    /// started; the old session stays disposed and evicted either way.
    pub async fn restart(&self, workspace: &WorkspaceKey) -> Result<Arc<ReplSession>> {
        let guard = self.creation_guard(workspace);
        let _creating = guard.lock().await;

        let old = self.table.lock().await.remove(workspace);
        if let Some(old) = old {
            info!(session_id = %old.id(), workspace = %workspace, "disposing session for restart");
            old.dispose().await;
        }

        let session = self.start_session(workspace).await?;
        self.table
            .lock()
            .await
            .insert(workspace.clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Clear the workspace's session screen and reload its modules.
    /// No-op when the workspace has no live session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if a directive cannot be written.
    pub async fn clear(&self, workspace: &WorkspaceKey) -> Result<()> {
        match self.live(workspace).await {
            Some(session) => session.clear().await,
            None => Ok(()),
        }
    }

    /// Session for a workspace, if one is registered.
    pub async fn get(&self, workspace: &WorkspaceKey) -> Option<Arc<ReplSession>> {
        self.table.lock().await.get(workspace).cloned()
    }

    /// Number of registered sessions.
    pub async fn session_count(&self) -> usize {
        self.table.lock().await.len()
    }

    /// Dispose every live session and empty the table.
    pub async fn dispose_all(&self) {
        let sessions: Vec<Arc<ReplSession>> = {
            let mut table = self.table.lock().await;
            table.drain().map(|(_, session)| session).collect()
        };

        let count = sessions.len();
        for session in sessions {
            session.dispose().await;
        }
        info!(count, "all sessions disposed");
    }

    async fn live(&self, workspace: &WorkspaceKey) -> Option<Arc<ReplSession>> {
        let table = self.table.lock().await;
        table
            .get(workspace)
            .filter(|session| !session.is_disposed())
            .cloned()
    }

    /// Per-workspace guard serializing creation and restart. One guard per
    /// workspace key; the map itself is only locked long enough to hand
    /// the guard out.
    fn creation_guard(&self, workspace: &WorkspaceKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut guards = self.guards.lock();
        Arc::clone(guards.entry(workspace.clone()).or_default())
    }

    async fn start_session(&self, workspace: &WorkspaceKey) -> Result<Arc<ReplSession>> {
        ReplSession::start(
            workspace.clone(),
            &*self.launcher,
            Arc::clone(&self.display),
            &self.config,
        )
        .await
    }
}
