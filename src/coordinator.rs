//! Coordinator facade composing the detector and the registry.
//!
//! This is the entry point editor-integration glue calls into. It is an
//! explicitly constructed, explicitly owned service: build one per process,
//! pass it to callers, and call [`Coordinator::shutdown`] at process exit.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::CoordinatorConfig;
use crate::environment::EnvironmentDetector;
use crate::launcher::{DisplaySurface, ProcessLauncher, StdioSurface, TokioLauncher};
use crate::models::environment::ToolName;
use crate::models::workspace::WorkspaceKey;
use crate::session::{ReplSession, SessionRegistry};
use crate::{AppError, Result};

/// Session and environment coordinator.
pub struct Coordinator {
    detector: EnvironmentDetector,
    registry: SessionRegistry,
}

impl Coordinator {
    /// Build a coordinator over explicit collaborators.
    #[must_use]
    pub fn new(
        config: CoordinatorConfig,
        launcher: Arc<dyn ProcessLauncher>,
        display: Arc<dyn DisplaySurface>,
    ) -> Self {
        let config = Arc::new(config);
        let detector = EnvironmentDetector::new(
            Arc::clone(&launcher),
            config.tools.clone(),
            config.probe_timeout(),
        );
        let registry = SessionRegistry::new(config, launcher, display);
        Self { detector, registry }
    }

    /// Build a coordinator over the production process launcher and
    /// display surface.
    #[must_use]
    pub fn with_process_launcher(config: CoordinatorConfig) -> Self {
        let launcher = Arc::new(TokioLauncher::new(config.shutdown_grace()));
        Self::new(config, launcher, Arc::new(StdioSurface))
    }

    /// Whether the workspace's environment exposes the required tools.
    ///
    /// Cached per workspace; an invalid environment is an expected outcome
    /// and surfaces as `false`, with [`Coordinator::missing_tools`]
    /// available for detail.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Workspace` if the path cannot form a workspace
    /// key.
    pub async fn ensure_environment(&self, workspace_path: impl AsRef<Path>) -> Result<bool> {
        let key = WorkspaceKey::new(workspace_path)?;
        Ok(self.detector.validate(&key, false).await)
    }

    /// Every absent tool in declared order, from a fresh probe.
    pub async fn missing_tools(&self) -> Vec<ToolName> {
        self.detector.missing_tools().await
    }

    /// Load a module into the workspace's session and evaluate an
    /// expression against it, creating the session on demand.
    ///
    /// If the session raced into `Disposed` under the first attempt (for
    /// example a concurrent restart), the coordinator transparently
    /// recreates it and retries exactly once.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Workspace` for an invalid path, `AppError::Launch`
    /// if a session cannot be started, or `AppError::Io` if a command cannot
    /// be written.
    pub async fn run_in_session(
        &self,
        workspace_path: impl AsRef<Path>,
        module_path: &str,
        expression: &str,
    ) -> Result<()> {
        let key = WorkspaceKey::new(workspace_path)?;
        let session = self.registry.get_or_create(&key).await?;

        match run_commands(&session, module_path, expression).await {
            Err(AppError::SessionDisposed(id)) => {
                info!(session_id = %id, workspace = %key, "session disposed mid-command, recreating");
                let fresh = self.registry.get_or_create(&key).await?;
                run_commands(&fresh, module_path, expression).await
            }
            other => other,
        }
    }

    /// Dispose the workspace's session and start a fresh one. Also drops
    /// the workspace's cached environment record so the next validation
    /// re-probes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Workspace` for an invalid path or
    /// `AppError::Launch` if the fresh session cannot be started.
    pub async fn restart_session(&self, workspace_path: impl AsRef<Path>) -> Result<()> {
        let key = WorkspaceKey::new(workspace_path)?;
        self.detector.invalidate(&key);
        self.registry.restart(&key).await?;
        Ok(())
    }

    /// Clear the workspace's session screen and reload its modules.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Workspace` for an invalid path or `AppError::Io`
    /// if a directive cannot be written.
    pub async fn clear_session(&self, workspace_path: impl AsRef<Path>) -> Result<()> {
        let key = WorkspaceKey::new(workspace_path)?;
        self.registry.clear(&key).await
    }

    /// Dispose every session and drop all cached environment records.
    pub async fn shutdown(&self) {
        self.registry.dispose_all().await;
        self.detector.clear_cache();
        info!("coordinator shut down");
    }

    /// The environment detector, for collaborators needing direct access.
    #[must_use]
    pub fn detector(&self) -> &EnvironmentDetector {
        &self.detector
    }

    /// The session registry, for collaborators needing direct access.
    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}

/// Load then evaluate, aborting on the first failure.
async fn run_commands(session: &ReplSession, module_path: &str, expression: &str) -> Result<()> {
    session.load_module(module_path).await?;
    session.evaluate(expression).await
}
