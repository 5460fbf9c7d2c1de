//! コマンドラインインターフェースのテスト

use std::process::{Command, Output};

use tempfile::TempDir;

fn monomorph(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_monomorph"))
        .args(args)
        .env("RUST_LOG", "error")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute monomorph")
}

/// demo コマンドでワークスペースを書き出す
fn demo_workspace(dir: &TempDir) -> String {
    let path = dir.path().join("demo.json");
    let path = path.to_str().unwrap().to_string();
    let output = monomorph(&["demo", "-o", &path]);
    assert!(output.status.success(), "demo command failed: {:?}", output);
    path
}

#[test]
fn test_instantiate_command_prints_declarations() {
    let dir = TempDir::new().unwrap();
    let path = demo_workspace(&dir);

    let output = monomorph(&["instantiate", &path, "--name", "Reverse", "--types", "int"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("// function Reverse instantiated as Reverse_int"));
    assert!(stdout.contains("func Reverse_int(s []int) []int {"));
}

#[test]
fn test_instantiate_command_json_output() {
    let dir = TempDir::new().unwrap();
    let path = demo_workspace(&dir);

    let output = monomorph(&[
        "instantiate",
        &path,
        "--name",
        "Pair",
        "--types",
        "int,string",
        "--format",
        "json",
    ]);

    assert!(output.status.success());
    let decls: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(decls.as_array().map(Vec::len), Some(3));
}

#[test]
fn test_list_command() {
    let dir = TempDir::new().unwrap();
    let path = demo_workspace(&dir);

    let output = monomorph(&["list", &path]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("main.Pair"));
    assert!(stdout.contains("methods: Swap, First"));
    assert!(stdout.contains("main.Map"));
}

#[test]
fn test_errors_exit_with_failure() {
    let dir = TempDir::new().unwrap();
    let path = demo_workspace(&dir);

    let missing = monomorph(&["instantiate", &path, "--name", "Missing"]);
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("error"));

    let arity = monomorph(&["instantiate", &path, "--name", "Map", "--types", "int"]);
    assert!(!arity.status.success());
    assert!(String::from_utf8_lossy(&arity.stderr).contains("internal error"));

    let unreadable = monomorph(&["list", "/nonexistent/workspace.json"]);
    assert!(!unreadable.status.success());
    assert!(String::from_utf8_lossy(&unreadable.stderr).contains("Failed to read workspace"));
}
