//! Unit tests for the compiler-output diagnostics parser.

use std::path::{Path, PathBuf};

use repl_coordinator::diagnostics::{parse_output, Severity};

const WS: &str = "/ws/project";

#[test]
fn parses_an_error_line() {
    let output = "src/Main.hs:10:5: error: parse error on input `where'";
    let diagnostics = parse_output(output, Path::new(WS));

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.file, PathBuf::from("/ws/project/src/Main.hs"));
    assert_eq!(diagnostic.line, 10);
    assert_eq!(diagnostic.column, 5);
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.message, "parse error on input `where'");
}

#[test]
fn parses_a_warning_line() {
    let output = "Lib.hs:3:1: warning: Defined but not used: helper";
    let diagnostics = parse_output(output, Path::new(WS));

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].message, "Defined but not used: helper");
}

#[test]
fn absolute_paths_are_left_untouched() {
    let output = "/abs/Other.hs:1:1: error: boom";
    let diagnostics = parse_output(output, Path::new(WS));
    assert_eq!(diagnostics[0].file, PathBuf::from("/abs/Other.hs"));
}

#[test]
fn non_matching_lines_are_skipped() {
    let output = "GHCi, version 9.4.8\nPrelude> :load Main\nOk, one module loaded.";
    assert!(parse_output(output, Path::new(WS)).is_empty());
}

#[test]
fn mixed_output_yields_only_diagnostic_lines() {
    let output = "\
Compiling Main
Main.hs:1:1: error: first
noise line
Main.hs:2:2: warning: second
";
    let diagnostics = parse_output(output, Path::new(WS));
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(diagnostics[1].severity, Severity::Warning);
}

#[test]
fn message_whitespace_is_trimmed() {
    let output = "Main.hs:1:1: error:    padded message   ";
    let diagnostics = parse_output(output, Path::new(WS));
    assert_eq!(diagnostics[0].message, "padded message");
}

#[test]
fn empty_output_yields_no_diagnostics() {
    assert!(parse_output("", Path::new(WS)).is_empty());
}
