//! One interactive REPL process bound to a workspace.
//!
//! The underlying interpreter has a single unstructured input/output stream
//! and no reply channel, so commands are fire-and-settle: each one is
//! submitted as a line of text, then the session waits a bounded settle
//! interval before accepting the next command. Correctness relies on the
//! per-session serialization point plus those settle intervals, never on
//! parsing acknowledgements.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::CoordinatorConfig;
use crate::launcher::{DisplaySurface, ProcessHandle, ProcessLauncher};
use crate::models::session::SessionState;
use crate::models::workspace::WorkspaceKey;
use crate::{AppError, Result};

/// State guarded by the session's command serialization point.
struct SessionInner {
    handle: Option<Box<dyn ProcessHandle>>,
    loaded_modules: BTreeSet<String>,
    command_seq: u64,
}

/// One interactive runtime process bound to a workspace.
///
/// All commands route through a single mutex held across the send and its
/// settle interval, so the process observes them in strict submission
/// order. `dispose` cancels the session token, which forcibly ends any
/// settle wait in progress; dispose always wins.
pub struct ReplSession {
    id: String,
    workspace: WorkspaceKey,
    state: Mutex<SessionState>,
    cancel: CancellationToken,
    load_settle: Duration,
    eval_settle: Duration,
    display: Arc<dyn DisplaySurface>,
    inner: tokio::sync::Mutex<SessionInner>,
}

impl ReplSession {
    /// Launch the interpreter in the workspace's root directory.
    ///
    /// On success the session is `Idle`. On failure no process is left
    /// behind and the caller must retry via the registry.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Launch` if the interpreter cannot be started.
    pub async fn start(
        workspace: WorkspaceKey,
        launcher: &dyn ProcessLauncher,
        display: Arc<dyn DisplaySurface>,
        config: &CoordinatorConfig,
    ) -> Result<Arc<Self>> {
        let id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("start_session", session_id = %id, workspace = %workspace);
        let _guard = span.enter();

        let handle = launcher
            .spawn_interactive(
                &config.tools.interpreter,
                &config.repl.interpreter_args,
                workspace.path(),
            )
            .await?;

        display.reveal();
        info!(pid = handle.pid().unwrap_or(0), "repl session started");

        Ok(Arc::new(Self {
            id,
            workspace,
            state: Mutex::new(SessionState::Idle),
            cancel: CancellationToken::new(),
            load_settle: config.load_settle(),
            eval_settle: config.eval_settle(),
            display,
            inner: tokio::sync::Mutex::new(SessionInner {
                handle: Some(handle),
                loaded_modules: BTreeSet::new(),
                command_seq: 0,
            }),
        }))
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Workspace this session is bound to.
    #[must_use]
    pub fn workspace(&self) -> &WorkspaceKey {
        &self.workspace
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Whether the session has reached its terminal state.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled() || self.state().is_terminal()
    }

    /// Snapshot of the modules loaded into this session.
    pub async fn loaded_modules(&self) -> BTreeSet<String> {
        self.inner.lock().await.loaded_modules.clone()
    }

    /// Number of commands submitted to this session so far.
    pub async fn command_seq(&self) -> u64 {
        self.inner.lock().await.command_seq
    }

    /// Issue the module-load directive and wait for the load settle
    /// interval.
    ///
    /// Loading an already-loaded path re-issues the directive so on-disk
    /// edits are picked up.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionDisposed` if the session is disposed before
    /// or during the command, or `AppError::Io` if the directive cannot be
    /// written.
    pub async fn load_module(&self, module: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        self.ensure_live()?;
        let handle = self.live_handle(&mut inner)?;

        self.set_busy();
        self.display.reveal();
        let sent = handle.send_line(&format!(":load \"{module}\"")).await;
        if let Err(err) = sent {
            self.finish_command();
            return Err(err);
        }

        inner.loaded_modules.insert(module.to_owned());
        inner.command_seq += 1;

        let settled = self.settle(self.load_settle).await;
        self.finish_command();
        settled
    }

    /// Submit an expression for evaluation and wait for the evaluation
    /// settle interval.
    ///
    /// The expression is never inspected and its output is never captured;
    /// the user observes the runtime's output directly on the session's
    /// display surface.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionDisposed` if the session is disposed before
    /// or during the command, or `AppError::Io` if the expression cannot be
    /// written.
    pub async fn evaluate(&self, expression: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        self.ensure_live()?;
        let handle = self.live_handle(&mut inner)?;

        self.set_busy();
        self.display.reveal();
        let sent = handle.send_line(expression).await;
        if let Err(err) = sent {
            self.finish_command();
            return Err(err);
        }

        inner.command_seq += 1;

        let settled = self.settle(self.eval_settle).await;
        self.finish_command();
        settled
    }

    /// Clear the runtime's screen and reload every loaded module.
    ///
    /// Neither the session state nor the loaded-module set changes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionDisposed` if the session is disposed, or
    /// `AppError::Io` if a directive cannot be written.
    pub async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        self.ensure_live()?;
        let handle = self.live_handle(&mut inner)?;

        handle.send_line(":!clear").await?;
        handle.send_line(":reload").await?;
        Ok(())
    }

    /// Terminate the underlying process and release resources. Idempotent.
    ///
    /// Cancels the session token first so any command waiting out its
    /// settle interval aborts immediately, then terminates the child.
    pub async fn dispose(&self) {
        self.cancel.cancel();

        let mut inner = self.inner.lock().await;
        if let Some(mut handle) = inner.handle.take() {
            if let Err(err) = handle.terminate().await {
                warn!(session_id = %self.id, %err, "failed to terminate interactive process");
            }
        }
        *self.state.lock() = SessionState::Disposed;
        info!(session_id = %self.id, "session disposed");
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(AppError::SessionDisposed(self.id.clone()))
        } else {
            Ok(())
        }
    }

    /// Borrow the live process handle, or fail as disposed.
    fn live_handle<'a>(
        &self,
        inner: &'a mut SessionInner,
    ) -> Result<&'a mut Box<dyn ProcessHandle>> {
        inner
            .handle
            .as_mut()
            .ok_or_else(|| AppError::SessionDisposed(self.id.clone()))
    }

    fn set_busy(&self) {
        let mut state = self.state.lock();
        if !state.is_terminal() {
            *state = SessionState::Busy;
        }
    }

    /// Return to `Idle` unless the session was disposed mid-command.
    fn finish_command(&self) {
        let mut state = self.state.lock();
        if !state.is_terminal() && !self.cancel.is_cancelled() {
            *state = SessionState::Idle;
        }
    }

    /// Wait out a settle interval, aborting immediately on dispose.
    async fn settle(&self, wait: Duration) -> Result<()> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(AppError::SessionDisposed(self.id.clone())),
            () = tokio::time::sleep(wait) => Ok(()),
        }
    }
}
