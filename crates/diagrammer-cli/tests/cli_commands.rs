//! End-to-end tests that run the `diagrammer` binary
//!
//! Input is written to temp files; logging is switched off so stderr only
//! carries the CLI's own messages.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_diagrammer"))
        .args(args)
        .env("DIAGRAMMER_LOG_LEVEL", "off")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run diagrammer")
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_format_command() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "in.mmd", "graph LR; A[Start]-->B[End]");

    let output = run(&["format", "-i", &input]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "flowchart LR\n    A[Start]\n    B[End]\n    A --> B\n"
    );
}

#[test]
fn test_format_with_indent_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "in.mmd", "sequenceDiagram\nA->>B: hi");
    let out = dir.path().join("out.mmd");

    let output = run(&["--indent", "2", "format", "-i", &input, "-o", out.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "sequenceDiagram\n  participant A\n  participant B\n  A->>B: hi"
    );
}

#[test]
fn test_parse_then_generate() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "in.mmd", "erDiagram\n    A ||--o{ B : has");
    let model = dir.path().join("model.json");

    let parsed = run(&["parse", "-i", &input, "-o", model.to_str().unwrap()]);
    assert!(parsed.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&model).unwrap()).unwrap();
    assert_eq!(json["diagram_type"], "er");

    let generated = run(&["generate", "-i", model.to_str().unwrap()]);
    assert!(generated.status.success());
    assert!(stdout(&generated).contains("A ||--o{ B : has"));
}

#[test]
fn test_validate_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "bad.mmd", "flowchart TD\n    A[Start --> B");

    let output = run(&["validate", "-i", &input, "--suggest"]);
    assert_eq!(output.status.code(), Some(1));
    let report = stdout(&output);
    assert!(report.contains("✗ Invalid flowchart diagram"));
    assert!(report.contains("Suggestions:"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: Validation failed"));
}

#[test]
fn test_validate_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "ok.mmd", "classDiagram\n    A --|> B");

    let output = run(&["validate", "-i", &input, "--json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["is_valid"], true);
    assert_eq!(json["diagram_type"], "classDiagram");
}

#[test]
fn test_detect_command() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "in.mmd", "%% comment\nstateDiagram-v2\n    [*] --> A");

    let output = run(&["detect", "-i", &input]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "state");
}

#[test]
fn test_detect_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "in.mmd", "pie title Pets");

    let output = run(&["detect", "-i", &input]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown diagram type: pie"));
}

#[test]
fn test_types_json() {
    let output = run(&["types", "--json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["total"], 5);
}

#[test]
fn test_missing_input_file() {
    let output = run(&["format", "-i", "/nonexistent/diagram.mmd"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read input file"));
}
