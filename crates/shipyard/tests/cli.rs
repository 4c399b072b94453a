//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Runs our binary in `dir`, logging into the same directory.
#[allow(deprecated)]
fn cmd_in(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.current_dir(dir.path()).env("SHIPYARD_LOG_DIR", dir.path().join("logs"));
    cmd
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    let tmp = TempDir::new().unwrap();
    cmd_in(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn version_flag_shows_version() {
    let tmp = TempDir::new().unwrap();
    cmd_in(&tmp)
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn long_help_lists_environment() {
    let tmp = TempDir::new().unwrap();
    cmd_in(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SHIPYARD_LOG_PATH"));
}

// =============================================================================
// Info Command
// =============================================================================

#[test]
fn info_json_outputs_valid_json() {
    let tmp = TempDir::new().unwrap();
    let output = cmd_in(&tmp).args(["info", "--json"]).assert().success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("info --json should output valid JSON");

    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["config"]["log_level"], "info");
}

// =============================================================================
// Config Command
// =============================================================================

#[test]
fn config_without_project_fails() {
    let tmp = TempDir::new().unwrap();
    cmd_in(&tmp)
        .args(["config", "--no-git", "--color", "never"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("project.name must not be blank"));
}

#[test]
fn config_json_reports_keys() {
    let tmp = TempDir::new().unwrap();
    let output = cmd_in(&tmp)
        .args(["config", "--no-git", "--json"])
        .assert()
        .failure();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["mode"], "CONFIG");
    assert_eq!(json["configuration"][0]["key"], "validation_must_not_be_blank");
}

#[test]
fn config_rejects_unknown_mode() {
    let tmp = TempDir::new().unwrap();
    cmd_in(&tmp)
        .args(["config", "--mode", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown Mode 'sideways'"));
}

#[test]
fn config_rejects_unknown_platform() {
    let tmp = TempDir::new().unwrap();
    cmd_in(&tmp)
        .args(["config", "--no-git", "--select-platform", "plan9-mips"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("plan9-mips"));
}

#[test]
fn config_rejects_malformed_filter() {
    let tmp = TempDir::new().unwrap();
    cmd_in(&tmp)
        .args(["config", "--include", "slack"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SCOPE=NAME"));
}

// =============================================================================
// Global Flags
// =============================================================================

#[test]
fn global_flags_accepted() {
    let tmp = TempDir::new().unwrap();
    for flags in [&["-q"][..], &["-vv"], &["--color", "always"], &["--color", "never"]] {
        cmd_in(&tmp).args(flags).arg("info").assert().success();
    }
}

#[test]
fn no_subcommand_shows_help() {
    let tmp = TempDir::new().unwrap();
    cmd_in(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn chdir_nonexistent_fails() {
    let tmp = TempDir::new().unwrap();
    cmd_in(&tmp)
        .args(["-C", "/nonexistent/path/that/does/not/exist", "info"])
        .assert()
        .failure();
}
