//! Coordinator configuration parsing and validation.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Binary names for the external tools the detector probes and the
/// session launches.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ToolsConfig {
    /// Interactive interpreter binary.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Single-file script runner binary.
    #[serde(default = "default_script_runner")]
    pub script_runner: String,
    /// Build tool binary.
    #[serde(default = "default_build_tool")]
    pub build_tool: String,
}

fn default_interpreter() -> String {
    "ghci".into()
}

fn default_script_runner() -> String {
    "runghc".into()
}

fn default_build_tool() -> String {
    "stack".into()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            script_runner: default_script_runner(),
            build_tool: default_build_tool(),
        }
    }
}

/// Tool-presence probe settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DetectionConfig {
    /// Per-probe timeout; a probe exceeding it reports the tool as absent.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

/// Interactive session settings.
///
/// The settle intervals bound how long a command holds the session's
/// serialization point after its text has been submitted; the runtime has
/// no structured reply channel to signal completion.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReplConfig {
    /// Extra arguments passed to the interpreter at launch.
    #[serde(default)]
    pub interpreter_args: Vec<String>,
    /// Settle interval after a module-load directive.
    #[serde(default = "default_load_settle_ms")]
    pub load_settle_ms: u64,
    /// Settle interval after submitting an expression.
    #[serde(default = "default_eval_settle_ms")]
    pub eval_settle_ms: u64,
    /// Grace period for the child to exit after stdin closes, before a
    /// forced kill.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

fn default_load_settle_ms() -> u64 {
    1000
}

fn default_eval_settle_ms() -> u64 {
    300
}

fn default_shutdown_grace_ms() -> u64 {
    5000
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            interpreter_args: Vec::new(),
            load_settle_ms: default_load_settle_ms(),
            eval_settle_ms: default_eval_settle_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

/// Coordinator configuration parsed from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CoordinatorConfig {
    /// Tool binary names.
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Probe settings.
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Session settings.
    #[serde(default)]
    pub repl: ReplConfig,
}

impl CoordinatorConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Per-probe timeout as a [`Duration`].
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.detection.probe_timeout_ms)
    }

    /// Module-load settle interval as a [`Duration`].
    #[must_use]
    pub fn load_settle(&self) -> Duration {
        Duration::from_millis(self.repl.load_settle_ms)
    }

    /// Evaluation settle interval as a [`Duration`].
    #[must_use]
    pub fn eval_settle(&self) -> Duration {
        Duration::from_millis(self.repl.eval_settle_ms)
    }

    /// Child shutdown grace period as a [`Duration`].
    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.repl.shutdown_grace_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.tools.interpreter.is_empty()
            || self.tools.script_runner.is_empty()
            || self.tools.build_tool.is_empty()
        {
            return Err(AppError::Config(
                "tool binary names must not be empty".into(),
            ));
        }

        if self.detection.probe_timeout_ms == 0 {
            return Err(AppError::Config(
                "detection.probe_timeout_ms must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
