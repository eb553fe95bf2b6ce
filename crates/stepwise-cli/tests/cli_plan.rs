use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SHOP: &str = r#"
[project]
name = "shop"
namespaces = ["scout", "app"]

[[unit]]
version = "scout-1"

[[unit]]
version = "scout-2"

[[unit]]
version = "app-1"
depends = ["scout-1"]

[states]
production = ["scout-1", "app-0"]
fresh = ["scout-0", "app-0"]
"#;

fn stepwise_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stepwise").unwrap();
    cmd.env("STEPWISE_HOME", home).env_remove("STEPWISE_MANIFEST");
    cmd
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("Stepwise.toml"), SHOP).unwrap();
    tmp
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_order_prints_every_unit() {
    let tmp = project();

    stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["order"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Apply (3):"))
        .stdout(predicate::str::is_match(r"(?s)scout-1.*scout-2.*app-1").unwrap());
}

#[test]
fn test_order_reports_summary_on_stderr() {
    let tmp = project();

    stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["order"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Ordered"))
        .stderr(predicate::str::contains("3 units across 2 namespaces"));
}

#[test]
fn test_order_json() {
    let tmp = project();

    let output = stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["order", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        json_stdout(&output),
        serde_json::json!({
            "ordered": ["scout-1", "scout-2", "app-1"],
            "unsatisfied": [],
            "valid": true
        })
    );
}

#[test]
fn test_plan_between_explicit_versions() {
    let tmp = project();

    let output = stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["plan", "--json", "--from", "scout-1", "app-0", "--to", "scout-2", "app-1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report = json_stdout(&output);
    assert_eq!(report["ordered"], serde_json::json!(["scout-2", "app-1"]));
    assert_eq!(report["valid"], true);
}

#[test]
fn test_plan_from_named_state_to_latest() {
    let tmp = project();

    stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["plan", "--from-state", "production", "--to-latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Apply (2):"))
        .stdout(predicate::str::is_match(r"(?s)scout-2.*app-1").unwrap());
}

#[test]
fn test_plan_defaults_to_initial_state() {
    let tmp = project();

    stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["plan", "--to-latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Apply (3):"));
}

#[test]
fn test_plan_nothing_to_apply() {
    let tmp = project();

    stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["plan", "--from", "scout-2", "app-1", "--to-latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to apply."));
}

#[test]
fn test_plan_unsatisfied_fails_by_default() {
    let tmp = project();

    stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["plan", "--from-state", "fresh", "--to", "app-1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("scout-1 is required but not yet applied"))
        .stderr(predicate::str::contains("Unsatisfied dependencies"));
}

#[test]
fn test_plan_allow_unsatisfied() {
    let tmp = project();

    let output = stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["--json", "plan", "--from-state", "fresh", "--to", "app-1", "--allow-unsatisfied"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report = json_stdout(&output);
    assert_eq!(report["ordered"], serde_json::json!(["app-1"]));
    assert_eq!(report["unsatisfied"], serde_json::json!(["scout-1", "scout-2"]));
    assert_eq!(report["valid"], false);
}

#[test]
fn test_plan_global_config_allows_unsatisfied() {
    let tmp = project();
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("config.toml"),
        "[plan]\nfail-on-unsatisfied = false\n",
    )
    .unwrap();

    stepwise_cmd(home.path())
        .current_dir(tmp.path())
        .args(["plan", "--from-state", "fresh", "--to", "app-1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("scout-1, scout-2"));
}

#[test]
fn test_global_config_json_output() {
    let tmp = project();
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("config.toml"), "[output]\nformat = \"json\"\n").unwrap();

    let output = stepwise_cmd(home.path())
        .current_dir(tmp.path())
        .args(["order"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["valid"], true);
}

#[test]
fn test_broken_global_config_falls_back_to_defaults() {
    let tmp = project();
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("config.toml"), "[output\n").unwrap();

    stepwise_cmd(home.path())
        .current_dir(tmp.path())
        .args(["order"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Apply (3):"))
        .stderr(predicate::str::contains("using defaults"));
}

#[test]
fn test_plan_duplicate_namespace_in_query_fails() {
    let tmp = project();

    stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["plan", "--from", "scout-0", "scout-1", "--to-latest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scout"));
}

#[test]
fn test_plan_unknown_state_fails() {
    let tmp = project();

    stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["plan", "--from-state", "staging", "--to-latest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No state named 'staging'"));
}

#[test]
fn test_plan_without_target_fails() {
    let tmp = project();

    stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["plan", "--from", "scout-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No target state"));
}

#[test]
fn test_plan_rejects_malformed_version_argument() {
    let tmp = project();

    stepwise_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["plan", "--to", "scout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed version"));
}
