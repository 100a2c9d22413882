//! Tool-presence detector with per-workspace caching and single-flight
//! probe coalescing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::ToolsConfig;
use crate::launcher::ProcessLauncher;
use crate::models::environment::{EnvironmentRecord, ToolName};
use crate::models::workspace::WorkspaceKey;

/// In-flight probe shared by every caller waiting on the same workspace.
type SharedProbe = Shared<BoxFuture<'static, Arc<EnvironmentRecord>>>;

/// Answers "is this workspace's environment usable?" and "which required
/// tools are missing?" while minimizing redundant probing.
///
/// At most one probe runs per workspace at any time: late callers attach to
/// the in-flight shared future instead of starting a second probe.
pub struct EnvironmentDetector {
    launcher: Arc<dyn ProcessLauncher>,
    tools: ToolsConfig,
    probe_timeout: Duration,
    cache: Arc<Mutex<HashMap<WorkspaceKey, Arc<EnvironmentRecord>>>>,
    inflight: Arc<Mutex<HashMap<WorkspaceKey, SharedProbe>>>,
}

impl EnvironmentDetector {
    /// Build a detector over the given launcher and tool binary names.
    #[must_use]
    pub fn new(
        launcher: Arc<dyn ProcessLauncher>,
        tools: ToolsConfig,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            launcher,
            tools,
            probe_timeout,
            cache: Arc::new(Mutex::new(HashMap::new())),
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Probe every tool in parallel and capture a fresh record.
    ///
    /// Each probe fails soft: a lookup error, non-zero exit, or timeout all
    /// map to the tool being absent, never to an error.
    pub async fn detect(&self) -> EnvironmentRecord {
        probe_all(
            Arc::clone(&self.launcher),
            self.tools.clone(),
            self.probe_timeout,
        )
        .await
    }

    /// Evaluate whether the workspace's environment is usable.
    ///
    /// Without `force_refresh`, a cached record answers immediately.
    /// Otherwise a coalesced probe runs and its record is cached before
    /// evaluation.
    pub async fn validate(&self, workspace: &WorkspaceKey, force_refresh: bool) -> bool {
        if !force_refresh {
            if let Some(record) = self.cached(workspace) {
                return record.is_valid();
            }
        }

        let record = self.detect_coalesced(workspace).await;
        let valid = record.is_valid();
        info!(workspace = %workspace, valid, "environment validated");
        valid
    }

    /// Every absent tool in declared order, from a fresh uncached probe.
    ///
    /// Callers use this right before offering installation, where a stale
    /// answer is unacceptable.
    pub async fn missing_tools(&self) -> Vec<ToolName> {
        self.detect().await.missing_tools()
    }

    /// Last cached record for a workspace, if any.
    #[must_use]
    pub fn cached(&self, workspace: &WorkspaceKey) -> Option<Arc<EnvironmentRecord>> {
        self.cache.lock().get(workspace).cloned()
    }

    /// Drop all cached records. In-flight probes are unaffected.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    /// Drop the cached record for one workspace, if any.
    pub fn invalidate(&self, workspace: &WorkspaceKey) {
        self.cache.lock().remove(workspace);
    }

    /// Run a probe for the workspace, attaching to an in-flight one when it
    /// exists. The finishing future caches its record and removes itself
    /// from the in-flight table.
    async fn detect_coalesced(&self, workspace: &WorkspaceKey) -> Arc<EnvironmentRecord> {
        let probe = {
            let mut inflight = self.inflight.lock();
            if let Some(existing) = inflight.get(workspace) {
                debug!(workspace = %workspace, "joining in-flight environment probe");
                existing.clone()
            } else {
                let launcher = Arc::clone(&self.launcher);
                let tools = self.tools.clone();
                let timeout = self.probe_timeout;
                let cache = Arc::clone(&self.cache);
                let table = Arc::clone(&self.inflight);
                let key = workspace.clone();

                let fut: SharedProbe = async move {
                    let record = Arc::new(probe_all(launcher, tools, timeout).await);
                    cache.lock().insert(key.clone(), Arc::clone(&record));
                    table.lock().remove(&key);
                    record
                }
                .boxed()
                .shared();

                inflight.insert(workspace.clone(), fut.clone());
                fut
            }
        };

        probe.await
    }
}

/// Probe all tools in parallel.
async fn probe_all(
    launcher: Arc<dyn ProcessLauncher>,
    tools: ToolsConfig,
    timeout: Duration,
) -> EnvironmentRecord {
    let (interpreter, script_runner, build_tool) = tokio::join!(
        probe_tool(&*launcher, &tools.interpreter, timeout),
        probe_tool(&*launcher, &tools.script_runner, timeout),
        probe_tool(&*launcher, &tools.build_tool, timeout),
    );
    EnvironmentRecord::capture(interpreter, script_runner, build_tool)
}

/// Resolve one binary via the platform lookup command.
async fn probe_tool(
    launcher: &dyn ProcessLauncher,
    binary: &str,
    timeout: Duration,
) -> Option<String> {
    let args = vec![binary.to_owned()];
    match launcher.run_capture(lookup_program(), &args, timeout).await {
        Ok(stdout) => {
            let path = stdout
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())?
                .to_owned();
            debug!(binary, path, "tool present");
            Some(path)
        }
        Err(err) => {
            debug!(binary, %err, "tool absent");
            None
        }
    }
}

/// Platform binary-lookup command.
const fn lookup_program() -> &'static str {
    if cfg!(windows) {
        "where"
    } else {
        "which"
    }
}
