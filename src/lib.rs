#![forbid(unsafe_code)]

//! Per-workspace coordinator for interactive `GHCi` sessions, plus an
//! environment-capability detector for the external Haskell tools the
//! workflow depends on.

pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod environment;
pub mod errors;
pub mod launcher;
pub mod models;
pub mod session;

pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use errors::{AppError, Result};
