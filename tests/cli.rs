use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use tempfile::tempdir;

fn bin() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("node-red-flow"));
    for var in [
        "NODE_RED_CONFIG",
        "NODE_RED_BASE_URL",
        "NODE_RED_ADMIN_ROOT",
        "NODE_RED_TOKEN",
        "NODE_RED_READ_ONLY",
        "NODE_RED_DEPLOYMENT_TYPE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn validate_accepts_a_clean_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flows.json");
    fs::write(
        &path,
        json!([
            {"id": "t1", "type": "tab", "label": "Main"},
            {"id": "a", "type": "inject", "x": 100, "y": 100, "z": "t1", "wires": [["b"]]},
            {"id": "b", "type": "debug", "x": 300, "y": 100, "z": "t1", "wires": []}
        ])
        .to_string(),
    )
    .unwrap();

    let output = bin().arg("validate").arg(&path).output().unwrap();
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["valid"], json!(true));
    assert_eq!(report["stats"]["wireCount"], json!(1));
}

#[test]
fn validate_fails_on_errors_from_stdin() {
    bin()
        .arg("validate")
        .write_stdin(r#"[{"id": "a", "type": "inject"}, {"id": "a", "type": "debug"}]"#)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Duplicate node ID: a"))
        .stderr(predicate::str::contains("1 validation error(s)"));
}

#[test]
fn validate_rejects_non_json() {
    bin()
        .arg("validate")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<stdin> is not valid JSON"));
}

#[test]
fn pattern_http_api_prints_a_deployable_unit() {
    let output = bin()
        .args(["pattern", "http-api", "--url", "/api/widgets", "--method", "post"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let unit = stdout_json(&output);
    let items = unit.as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0]["type"], json!("tab"));
    assert_eq!(items[1]["name"], json!("POST /api/widgets"));
}

#[test]
fn pattern_transform_takes_stages() {
    let output = bin()
        .args([
            "pattern",
            "transform",
            "--transform",
            "Trim=msg.payload = msg.payload.trim(); return msg;",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let unit = stdout_json(&output);
    assert_eq!(unit[2]["name"], json!("Trim"));
}

#[test]
fn pattern_http_api_without_url_fails() {
    bin()
        .args(["pattern", "http-api"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("baseUrl required"));
}

#[test]
fn unknown_pattern_is_rejected_by_the_parser() {
    bin()
        .args(["pattern", "fan-out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown pattern: fan-out"));
}

#[test]
fn template_list_filters_by_category() {
    let output = bin()
        .args(["template", "list", "--category", "api"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let ids: Vec<String> = stdout_json(&output)
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["http-api", "http-api-crud", "http-proxy"]);
}

#[test]
fn template_apply_unknown_fails() {
    bin()
        .args(["template", "apply", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template not found: nope"));
}

#[test]
fn catalog_info_resolves_aliases() {
    bin()
        .args(["catalog", "info", "httpIn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"http in\""));
}

#[test]
fn read_only_deploy_is_refused_before_any_request() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flows.json");
    fs::write(&path, r#"[{"id": "t1", "type": "tab", "label": "Main"}]"#).unwrap();

    bin()
        .args(["--read-only", "--base-url", "http://127.0.0.1:9", "flows", "deploy"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("read-only mode"))
        .stdout(predicate::str::contains("\"category\": \"configuration\""));
}

#[test]
fn tool_runs_local_actions() {
    let output = bin()
        .args(["tool", "--params", r#"{"action": "node_types"}"#])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["count"], json!(43));
}

#[test]
fn tool_reads_params_from_stdin() {
    bin()
        .arg("tool")
        .write_stdin(r#"{"action": "flow_create", "label": "Kitchen"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"Kitchen\""));
}
