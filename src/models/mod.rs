//! Domain models for workspaces, environment capability, and sessions.

pub mod environment;
pub mod session;
pub mod workspace;
