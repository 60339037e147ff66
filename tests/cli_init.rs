mod common;

use assert_cmd::Command;
use common::TestProject;
use predicates::prelude::*;

#[test]
fn init_writes_config_file() {
    let project = TestProject::new();

    Command::new(TestProject::beacon_bin())
        .arg("init")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Beacon config written"));

    assert!(project.path().join("beacon.toml").exists());
}

#[test]
fn init_json_output() {
    let project = TestProject::new();

    Command::new(TestProject::beacon_bin())
        .args(["--json", "init"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"initialized\""));
}

#[test]
fn init_twice_fails_without_force() {
    let project = TestProject::new();

    Command::new(TestProject::beacon_bin())
        .arg("init")
        .arg(project.path())
        .assert()
        .success();

    Command::new(TestProject::beacon_bin())
        .arg("init")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_force_overwrites() {
    let project = TestProject::new();

    Command::new(TestProject::beacon_bin())
        .arg("init")
        .arg(project.path())
        .assert()
        .success();

    Command::new(TestProject::beacon_bin())
        .args(["init", "--force"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Beacon config written"));
}

#[test]
fn init_default_config_is_valid_toml() {
    let project = TestProject::new();

    Command::new(TestProject::beacon_bin())
        .arg("init")
        .arg(project.path())
        .assert()
        .success();

    let config_content =
        std::fs::read_to_string(project.path().join("beacon.toml")).unwrap();
    let parsed: toml::Value = toml::from_str(&config_content).unwrap();

    assert!(parsed.get("store").is_some());
    assert!(parsed.get("rag").is_some());
    assert!(parsed.get("cache").is_some());
    assert!(parsed.get("gateway").is_some());
}

#[test]
fn init_quiet_suppresses_output() {
    let project = TestProject::new();

    Command::new(TestProject::beacon_bin())
        .args(["--quiet", "init"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
