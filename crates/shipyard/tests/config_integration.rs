//! Configuration integration tests.
//!
//! These tests verify config discovery, layering and validation from an
//! end-to-end perspective using the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const VALID: &str = r#"
[project]
name = "app"
version = "1.0.0"
authors = ["Ada Lovelace"]
"#;

#[allow(deprecated)]
fn cmd_in(dir: &std::path::Path, logs: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.current_dir(dir)
        .env("SHIPYARD_LOG_DIR", logs.path())
        .env_remove("SHIPYARD_ANNOUNCE_SLACK_TOKEN")
        .env_remove("SHIPYARD_SLACK_TOKEN");
    cmd
}

fn info_json(dir: &std::path::Path, logs: &TempDir) -> serde_json::Value {
    let output = cmd_in(dir, logs).args(["info", "--json"]).assert().success();
    serde_json::from_slice(&output.get_output().stdout).unwrap()
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn discovers_dotfile_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("nested").join("deep");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(tmp.path().join(".shipyard.toml"), VALID).unwrap();

    let json = info_json(&sub_dir, &logs);
    assert_eq!(json["project"]["name"], "app");
}

#[test]
fn yaml_config_is_read() {
    let tmp = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("shipyard.yml"),
        "settings:\n  log_level: warn\nproject:\n  name: yamlish\n",
    )
    .unwrap();

    let json = info_json(tmp.path(), &logs);
    assert_eq!(json["project"]["name"], "yamlish");
    assert_eq!(json["config"]["log_level"], "warn");
}

#[test]
fn explicit_config_wins_over_discovered() {
    let tmp = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    fs::write(tmp.path().join("shipyard.toml"), VALID).unwrap();
    let explicit = tmp.path().join("override.toml");
    fs::write(&explicit, "[project]\nname = \"override\"\n").unwrap();

    let output = cmd_in(tmp.path(), &logs)
        .args(["--config", explicit.to_str().unwrap(), "info", "--json"])
        .assert()
        .success();
    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json["project"]["name"], "override");
    assert_eq!(json["project"]["version"], "1.0.0");
}

#[test]
fn malformed_config_fails() {
    let tmp = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    fs::write(tmp.path().join("shipyard.toml"), "[project\nname =").unwrap();

    cmd_in(tmp.path(), &logs)
        .arg("info")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn valid_config_passes_and_writes_report() {
    let tmp = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    fs::write(tmp.path().join("shipyard.toml"), VALID).unwrap();

    cmd_in(tmp.path(), &logs)
        .args(["config", "--no-git", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration is valid"));

    let report = fs::read_to_string(tmp.path().join("out/shipyard/output.properties")).unwrap();
    assert!(report.contains("projectName=app"));
    assert!(report.contains("projectVersion=1.0.0"));
}

#[test]
fn active_slack_needs_a_token() {
    let tmp = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("shipyard.toml"),
        format!("{VALID}\n[announce.slack]\nactive = \"ALWAYS\"\n"),
    )
    .unwrap();

    let output = cmd_in(tmp.path(), &logs)
        .args(["config", "--no-git", "--json"])
        .assert()
        .failure();
    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json["configuration"][0]["key"], "validation_slack_token");
}

#[test]
fn runtime_property_supplies_the_token() {
    let tmp = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("shipyard.toml"),
        format!("{VALID}\n[announce.slack]\nactive = \"ALWAYS\"\n"),
    )
    .unwrap();

    cmd_in(tmp.path(), &logs)
        .args(["config", "--no-git", "-P", "announce.slack.token=xoxb-1"])
        .assert()
        .success();
}

#[test]
fn dry_run_skips_secrets() {
    let tmp = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("shipyard.toml"),
        format!("{VALID}\n[announce.slack]\nactive = \"ALWAYS\"\n"),
    )
    .unwrap();

    cmd_in(tmp.path(), &logs)
        .args(["config", "--no-git", "--dry-run"])
        .assert()
        .success();
}
