//! Process launcher boundary and its tokio implementation.
//!
//! The coordinator core talks to external processes through these traits:
//! short-lived tool-presence probes use [`ProcessLauncher::run_capture`],
//! and the long-lived interactive runtime uses
//! [`ProcessLauncher::spawn_interactive`]. Tests substitute a mock launcher.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, info, warn};

use crate::{AppError, Result};

/// Handle to a running interactive process.
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// Submit one line of text to the process's input stream.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the input stream is closed or the write
    /// fails.
    async fn send_line(&mut self, line: &str) -> Result<()>;

    /// Terminate the process, waiting a bounded grace period for a natural
    /// exit before force-killing. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the force-kill itself fails.
    async fn terminate(&mut self) -> Result<()>;

    /// OS process id, if the process is still tracked.
    fn pid(&self) -> Option<u32>;
}

/// Spawns external processes on behalf of the coordinator.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Launch a long-lived interactive process in `cwd` with piped input.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Launch` if the process cannot be started.
    async fn spawn_interactive(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<Box<dyn ProcessHandle>>;

    /// Run a short-lived command to completion and capture its stdout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the command cannot be run, exits non-zero,
    /// or exceeds `timeout`.
    async fn run_capture(&self, program: &str, args: &[String], timeout: Duration)
        -> Result<String>;
}

/// Something a session can be told to make visible to the user.
///
/// Purely presentational; the core never consumes a return value from it.
pub trait DisplaySurface: Send + Sync {
    /// Bring the session's output surface to the user's attention.
    fn reveal(&self);
}

/// Production display surface: session output rides the child's inherited
/// stdio, so there is nothing to raise beyond a debug note.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioSurface;

impl DisplaySurface for StdioSurface {
    fn reveal(&self) {
        debug!("repl output surface is the inherited stdio");
    }
}

/// [`ProcessLauncher`] backed by `tokio::process`.
#[derive(Debug, Clone)]
pub struct TokioLauncher {
    shutdown_grace: Duration,
}

impl TokioLauncher {
    /// Build a launcher whose interactive handles wait `shutdown_grace`
    /// for a natural exit before force-killing on terminate.
    #[must_use]
    pub fn new(shutdown_grace: Duration) -> Self {
        Self { shutdown_grace }
    }
}

#[async_trait]
impl ProcessLauncher for TokioLauncher {
    async fn spawn_interactive(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<Box<dyn ProcessHandle>> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            // Output is surfaced to the user directly, never captured.
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|err| AppError::Launch(format!("failed to spawn {program}: {err}")))?;

        let stdin = child.stdin.take().ok_or_else(|| {
            AppError::Launch(format!("spawned {program} without a writable stdin"))
        })?;

        info!(
            program,
            pid = child.id().unwrap_or(0),
            cwd = %cwd.display(),
            "interactive process spawned"
        );

        Ok(Box::new(TokioProcessHandle {
            child,
            stdin: Some(stdin),
            grace: self.shutdown_grace,
        }))
    }

    async fn run_capture(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(timeout, output)
            .await
            .map_err(|_| AppError::Io(format!("{program} timed out after {timeout:?}")))?
            .map_err(|err| AppError::Io(format!("failed to run {program}: {err}")))?;

        if !output.status.success() {
            return Err(AppError::Io(format!(
                "{program} exited with {}",
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Interactive process handle backed by a tokio child.
struct TokioProcessHandle {
    child: Child,
    stdin: Option<ChildStdin>,
    grace: Duration,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    async fn send_line(&mut self, line: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| AppError::Io("process input stream is closed".into()))?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn terminate(&mut self) -> Result<()> {
        // Closing stdin sends EOF; an interactive interpreter exits on it.
        drop(self.stdin.take());

        match tokio::time::timeout(self.grace, self.child.wait()).await {
            Ok(Ok(exit)) => {
                info!(?exit, "interactive process exited");
            }
            Ok(Err(err)) => {
                warn!(%err, "error waiting for interactive process");
            }
            Err(_) => {
                warn!("interactive process did not exit within grace period, forcing kill");
                self.child
                    .kill()
                    .await
                    .map_err(|err| AppError::Io(format!("failed to kill process: {err}")))?;
            }
        }

        Ok(())
    }

    fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}
