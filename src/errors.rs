//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
///
/// Expected outcomes of normal operation (a tool being absent, an
/// environment failing validation) are returned as values, never as
/// variants of this enum.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// File-system or I/O operation failure.
    Io(String),
    /// The interactive runtime process could not be started.
    Launch(String),
    /// An operation was attempted against a session that has been disposed.
    SessionDisposed(String),
    /// A workspace path failed normalization.
    Workspace(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::Launch(msg) => write!(f, "launch: {msg}"),
            Self::SessionDisposed(id) => write!(f, "session disposed: {id}"),
            Self::Workspace(msg) => write!(f, "workspace: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
