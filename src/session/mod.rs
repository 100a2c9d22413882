//! Interactive session modules.
//!
//! Covers the per-workspace REPL session (serialized fire-and-settle
//! commands over an unstructured text protocol) and the registry that
//! enforces one live session per workspace.

pub mod registry;
pub mod repl;

pub use registry::SessionRegistry;
pub use repl::ReplSession;
