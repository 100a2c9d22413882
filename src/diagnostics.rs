//! Line-oriented parsing of interpreter output into diagnostics.
//!
//! A pure function over raw runtime output; it sits outside the
//! coordinator's concurrency core and never sees the session internals.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Compilation or runtime error.
    Error,
    /// Compiler warning.
    Warning,
}

/// One diagnostic extracted from runtime output.
///
/// Line and column are 1-based, as the compiler reports them.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Diagnostic {
    /// File the diagnostic refers to, resolved against the workspace root
    /// when the compiler reported a relative path.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    /// Diagnostic severity.
    pub severity: Severity,
    /// Message text with surrounding whitespace trimmed.
    pub message: String,
}

/// Compiler diagnostics take the form `file:line:col: severity: message`.
fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^(.+):(\d+):(\d+):\s*(error|warning):(.*)$")
            .expect("diagnostic line pattern is a valid literal")
    })
}

/// Extract diagnostics from raw runtime output.
///
/// Lines that do not match the diagnostic pattern are skipped; relative
/// file paths are resolved against `workspace_root`.
#[must_use]
pub fn parse_output(output: &str, workspace_root: &Path) -> Vec<Diagnostic> {
    output
        .lines()
        .filter_map(|line| parse_line(line, workspace_root))
        .collect()
}

fn parse_line(line: &str, workspace_root: &Path) -> Option<Diagnostic> {
    let captures = line_pattern().captures(line)?;

    let file = Path::new(captures.get(1)?.as_str());
    let file = if file.is_absolute() {
        file.to_path_buf()
    } else {
        workspace_root.join(file)
    };

    let severity = match captures.get(4)?.as_str() {
        "error" => Severity::Error,
        _ => Severity::Warning,
    };

    Some(Diagnostic {
        file,
        line: captures.get(2)?.as_str().parse().ok()?,
        column: captures.get(3)?.as_str().parse().ok()?,
        severity,
        message: captures.get(5)?.as_str().trim().to_owned(),
    })
}
