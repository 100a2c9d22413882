//! Environment capability detection.
//!
//! Probes the host machine for the external tools the workflow depends on,
//! caches results per workspace, and coalesces concurrent probes.

pub mod detector;

pub use detector::EnvironmentDetector;
