//! Environment capability model: known external tools and probe records.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External tools the workflow depends on.
///
/// The set is fixed; variant order is the order `missing_tools` reports in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// The interactive interpreter (`ghci`).
    Interpreter,
    /// The single-file script runner (`runghc`).
    ScriptRunner,
    /// The batteries-included build tool (`stack`).
    BuildTool,
}

impl ToolName {
    /// Every known tool, in declared order.
    pub const ALL: [Self; 3] = [Self::Interpreter, Self::ScriptRunner, Self::BuildTool];
}

impl Display for ToolName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Interpreter => "interpreter",
            Self::ScriptRunner => "script-runner",
            Self::BuildTool => "build-tool",
        };
        write!(f, "{name}")
    }
}

/// Snapshot of one environment probe: the resolved location of each tool
/// (or `None` when absent) and when the probe ran.
///
/// Records are immutable once captured; a re-probe produces a new record
/// rather than mutating a cached one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct EnvironmentRecord {
    /// Resolved interpreter location, if found.
    pub interpreter: Option<String>,
    /// Resolved script-runner location, if found.
    pub script_runner: Option<String>,
    /// Resolved build-tool location, if found.
    pub build_tool: Option<String>,
    /// When this record was captured.
    pub captured_at: DateTime<Utc>,
}

impl EnvironmentRecord {
    /// Capture a record from probe results, stamped with the current time.
    #[must_use]
    pub fn capture(
        interpreter: Option<String>,
        script_runner: Option<String>,
        build_tool: Option<String>,
    ) -> Self {
        Self {
            interpreter,
            script_runner,
            build_tool,
            captured_at: Utc::now(),
        }
    }

    /// Resolved location of a tool, if present.
    #[must_use]
    pub fn location(&self, tool: ToolName) -> Option<&str> {
        match tool {
            ToolName::Interpreter => self.interpreter.as_deref(),
            ToolName::ScriptRunner => self.script_runner.as_deref(),
            ToolName::BuildTool => self.build_tool.as_deref(),
        }
    }

    /// Validity policy: the build tool substitutes for both the interpreter
    /// and the script runner, so the environment is usable when
    /// (interpreter or build tool) and (script runner or build tool) exist.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let has_build_tool = self.build_tool.is_some();
        (self.interpreter.is_some() || has_build_tool)
            && (self.script_runner.is_some() || has_build_tool)
    }

    /// Every absent tool, in declared enumeration order.
    #[must_use]
    pub fn missing_tools(&self) -> Vec<ToolName> {
        ToolName::ALL
            .into_iter()
            .filter(|tool| self.location(*tool).is_none())
            .collect()
    }
}
