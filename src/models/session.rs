//! Session lifecycle state model.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Lifecycle state of a REPL session.
///
/// A session value exists only once its process has been spawned, so the
/// launch phase has no state of its own: a failed launch yields an error,
/// never a session. Transitions are `Idle ⇄ Busy`, with `Disposed`
/// reachable from either and terminal. Restart never transitions in place;
/// it disposes and creates a fresh session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Ready to accept the next command.
    Idle,
    /// A command has been submitted and its settle interval has not elapsed.
    Busy,
    /// The underlying process has been terminated. Terminal.
    Disposed,
}

impl SessionState {
    /// Whether this state is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Disposed)
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
            Self::Disposed => "disposed",
        };
        write!(f, "{name}")
    }
}
