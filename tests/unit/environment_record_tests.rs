//! Unit tests for the environment record validity policy and reporting.

use chrono::Utc;
use repl_coordinator::models::environment::{EnvironmentRecord, ToolName};

fn record(
    interpreter: Option<&str>,
    script_runner: Option<&str>,
    build_tool: Option<&str>,
) -> EnvironmentRecord {
    EnvironmentRecord::capture(
        interpreter.map(str::to_owned),
        script_runner.map(str::to_owned),
        build_tool.map(str::to_owned),
    )
}

#[test]
fn interpreter_and_runner_is_valid() {
    assert!(record(Some("/bin/ghci"), Some("/bin/runghc"), None).is_valid());
}

#[test]
fn build_tool_alone_is_valid() {
    assert!(record(None, None, Some("/bin/stack")).is_valid());
}

#[test]
fn interpreter_alone_is_invalid() {
    assert!(!record(Some("/bin/ghci"), None, None).is_valid());
}

#[test]
fn runner_alone_is_invalid() {
    assert!(!record(None, Some("/bin/runghc"), None).is_valid());
}

#[test]
fn nothing_present_is_invalid() {
    assert!(!record(None, None, None).is_valid());
}

#[test]
fn everything_present_is_valid_with_nothing_missing() {
    let full = record(Some("/bin/ghci"), Some("/bin/runghc"), Some("/bin/stack"));
    assert!(full.is_valid());
    assert!(full.missing_tools().is_empty());
}

#[test]
fn missing_tools_come_back_in_declared_order() {
    let empty = record(None, None, None);
    assert_eq!(
        empty.missing_tools(),
        vec![
            ToolName::Interpreter,
            ToolName::ScriptRunner,
            ToolName::BuildTool
        ]
    );
}

#[test]
fn partial_record_reports_only_absent_tools() {
    let partial = record(Some("/bin/ghci"), Some("/bin/runghc"), None);
    assert_eq!(partial.missing_tools(), vec![ToolName::BuildTool]);
}

#[test]
fn location_resolves_per_tool() {
    let partial = record(Some("/bin/ghci"), None, Some("/bin/stack"));
    assert_eq!(partial.location(ToolName::Interpreter), Some("/bin/ghci"));
    assert_eq!(partial.location(ToolName::ScriptRunner), None);
    assert_eq!(partial.location(ToolName::BuildTool), Some("/bin/stack"));
}

#[test]
fn capture_stamps_the_record() {
    let before = Utc::now();
    let captured = record(None, None, None);
    let after = Utc::now();
    assert!(captured.captured_at >= before && captured.captured_at <= after);
}

#[test]
fn tool_names_serialize_snake_case() {
    let json = serde_json::to_string(&ToolName::ScriptRunner).expect("serialize");
    assert_eq!(json, "\"script_runner\"");
}

#[test]
fn tool_names_display_kebab_case() {
    assert_eq!(ToolName::Interpreter.to_string(), "interpreter");
    assert_eq!(ToolName::ScriptRunner.to_string(), "script-runner");
    assert_eq!(ToolName::BuildTool.to_string(), "build-tool");
}
