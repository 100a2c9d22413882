//! Workspace identity model.

use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Opaque identifier for a workspace root.
///
/// Wraps a lexically normalized absolute path: `.` segments, `..` segments,
/// and redundant separators are folded without touching the file system.
/// Two keys are equal iff they denote the same root, so the same directory
/// spelled two ways maps to one registry entry and one environment record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceKey(PathBuf);

impl WorkspaceKey {
    /// Build a key from a workspace root path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Workspace` if the path is not absolute.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(AppError::Workspace(format!(
                "workspace root must be an absolute path: {}",
                path.display()
            )));
        }
        Ok(Self(normalize(path)))
    }

    /// The normalized workspace root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Display for WorkspaceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Fold `.` and `..` segments lexically. A `..` at the root is dropped
/// since there is nothing above the root to ascend to.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
