use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const CONFIG_RS: &str = "use std::path::PathBuf;

pub struct Config {
    pub cwd: PathBuf,
}

pub fn load_config_as_toml(path: &str) -> String {
    path.to_string()
}
";

fn setup_project(root: &Path) {
    fs::create_dir_all(root.join("core/src")).unwrap();
    fs::write(root.join("core/src/config.rs"), CONFIG_RS).unwrap();
}

fn write_replay(root: &Path, definition_end_line: usize) -> PathBuf {
    let script = json!({
        "tools": [
            "analyze_code",
            "find_symbol_definitions",
            "find_symbol_references",
            "get_symbol_subgraph",
            "get_multiple_files_skeleton"
        ],
        "responses": [
            {
                "operation": "find_symbol_definitions",
                "key": "Config",
                "response": {"definitions": [
                    {"file_path": "core/src/config.rs", "start_line": 3, "end_line": definition_end_line}
                ]}
            },
            {
                "operation": "find_symbol_references",
                "key": "load_config_as_toml",
                "response": {"references": [{"file_path": "core/src/config.rs", "line": 7}]}
            },
            {
                "operation": "get_symbol_subgraph",
                "key": "Config",
                "response": {
                    "nodes": [{"id": "a", "name": "Config"}, {"id": "b", "name": "load_config_as_toml"}],
                    "edges": [{"source": "b", "target": "a"}]
                }
            }
        ]
    });
    let path = root.join("replay.json");
    fs::write(&path, serde_json::to_vec_pretty(&script).unwrap()).unwrap();
    path
}

#[allow(deprecated)]
fn verify_cmd(root: &Path, replay: &Path) -> Command {
    let mut cmd = Command::cargo_bin("context-verify").expect("binary");
    cmd.current_dir(root)
        .env_remove("RUST_LOG")
        .arg("--project-root")
        .arg(root)
        .arg("--replay")
        .arg(replay);
    cmd
}

#[test]
fn consistent_backend_is_ready_and_exits_zero() {
    let temp = tempdir().unwrap();
    setup_project(temp.path());
    let replay = write_replay(temp.path(), 5);

    let output = verify_cmd(temp.path(), &replay)
        .arg("--format")
        .arg("json")
        .output()
        .expect("command run");

    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let report: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(report["verdict"]["status"], "READY");
    assert_eq!(report["metrics"]["total"], 6);
    assert_eq!(report["metrics"]["verified_symbols"], 1);
    assert!(report["issues"].as_array().unwrap().is_empty());
}

#[test]
fn definition_past_end_of_file_is_not_ready() {
    let temp = tempdir().unwrap();
    setup_project(temp.path());
    let replay = write_replay(temp.path(), 999);

    verify_cmd(temp.path(), &replay)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Status: NOT_READY"))
        .stdout(predicate::str::contains("[CRITICAL] Core: Config definition"))
        .stdout(predicate::str::contains("invalid line range: 3-999"));
}

#[test]
fn markdown_report_has_case_table() {
    let temp = tempdir().unwrap();
    setup_project(temp.path());
    let replay = write_replay(temp.path(), 5);

    verify_cmd(temp.path(), &replay)
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Accuracy report"))
        .stdout(predicate::str::contains("| case | result | severity | details |"));
}

#[test]
fn invalid_config_exits_with_startup_error() {
    let temp = tempdir().unwrap();
    setup_project(temp.path());
    let replay = write_replay(temp.path(), 5);
    let config = temp.path().join("suite.toml");
    fs::write(&config, "ready_threshold = 150\n").unwrap();

    verify_cmd(temp.path(), &replay)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ready_threshold"));
}

#[test]
fn missing_replay_script_exits_with_startup_error() {
    let temp = tempdir().unwrap();
    verify_cmd(temp.path(), &temp.path().join("absent.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("replay script"));
}

#[test]
fn print_config_shows_effective_settings() {
    let temp = tempdir().unwrap();
    let replay = temp.path().join("replay.json");

    verify_cmd(temp.path(), &replay)
        .arg("--fallback")
        .arg("reject")
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("fallback_policy = \"reject\""))
        .stdout(predicate::str::contains("kind = \"replay\""));
}
