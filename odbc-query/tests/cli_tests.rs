//! End-to-end runs of the `sql_query` binary that never reach a driver.

use serde_json::{Value, json};
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;

fn sql_query() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sql_query"))
}

fn args_file(args: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{}", json!({ "ANSIBLE_MODULE_ARGS": args })).expect("write args");
    file
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is a JSON object")
}

#[test]
fn test_check_mode_from_file() {
    let file = args_file(&json!({
        "query": "drop table where name like ?",
        "values": ["%%"],
        "username": "uid",
        "password": "pwd",
        "dbtype": "mysql",
        "servername": "server",
        "database": "database",
        "_ansible_check_mode": true,
    }));

    let output = sql_query().arg(file.path()).output().expect("run sql_query");

    assert!(output.status.success());
    assert_eq!(stdout_json(&output), json!({"changed": false, "output": []}));
}

#[test]
fn test_missing_parameters_from_stdin() {
    let mut child = sql_query()
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn sql_query");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(br#"{"query": "select 1", "dsn": "some_server"}"#)
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");

    assert_eq!(output.status.code(), Some(1));
    let out = stdout_json(&output);
    assert_eq!(out["failed"], json!(true));
    assert_eq!(out["changed"], json!(false));
    assert_eq!(out["error_kind"], json!("missing_parameter"));
    assert!(
        out["msg"].as_str().unwrap_or_default().contains("username"),
        "{}",
        out
    );
}

#[test]
fn test_unreadable_arguments() {
    let file = NamedTempFile::new().expect("temp file");
    std::fs::write(file.path(), "not json").expect("write");

    let output = sql_query().arg(file.path()).output().expect("run sql_query");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["error_kind"], json!("invalid_parameter"));
}

#[test]
fn test_rejects_unknown_duplicate_policy() {
    let output = sql_query()
        .args(["--duplicate-columns", "first-wins"])
        .stdin(Stdio::null())
        .output()
        .expect("run sql_query");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
