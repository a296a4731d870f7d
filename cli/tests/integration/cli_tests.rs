//! CLI structure and argument parsing.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

use crate::jitp;

#[test]
fn test_cli_no_args_shows_help() {
    // clap with arg_required_else_help shows help on stderr and exits 2.
    // NO_COLOR counts as a supplied argument, so it must be unset here.
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jitp"));
    cmd.env_clear();
    cmd.assert().code(2).stderr(predicate::str::contains(
        "AWS IoT just-in-time provisioning toolkit",
    ));
}

#[test]
fn test_cli_no_subcommand_with_no_color_set_fails() {
    jitp()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("requires a subcommand"));
}

#[test]
fn test_no_color_accepts_numeric_value() {
    jitp()
        .arg("version")
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("jitp 0.1.0"));
}

#[test]
fn test_no_color_accepts_empty_value() {
    jitp()
        .arg("version")
        .env("NO_COLOR", "")
        .assert()
        .success();
}

#[test]
fn test_cli_help_lists_commands() {
    jitp()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("template"))
        .stdout(predicate::str::contains("connect"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    jitp()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("jitp"));
}

#[test]
fn test_version_command_shows_version() {
    jitp()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("jitp 0.1.0"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let out = jitp()
        .args(["version", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).expect("valid JSON");
    assert_eq!(value["version"], "0.1.0");
}

#[test]
fn test_unknown_command_fails() {
    jitp().arg("provision").assert().code(2);
}

#[test]
fn test_connect_requires_device_id() {
    jitp()
        .arg("connect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEVICE_ID is required"));
}

#[test]
fn test_connect_rejects_wildcard_tenant() {
    jitp()
        .arg("connect")
        .env("DEVICE_ID", "sensor-1")
        .env("MQTT_ENDPOINT", "abc-ats.iot.us-east-1.amazonaws.com")
        .env("TENANT_ID", "acme/#")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid tenant id"));
}

#[test]
fn test_connect_reports_missing_certificate_bundle() {
    let dir = tempfile::tempdir().expect("tempdir");
    jitp()
        .arg("connect")
        .current_dir(dir.path())
        .env("DEVICE_ID", "sensor-1")
        .env("MQTT_ENDPOINT", "abc-ats.iot.us-east-1.amazonaws.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("AmazonRootCA1.pem"));
}
