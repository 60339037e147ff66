mod common;

use assert_cmd::Command;
use common::TestProject;
use predicates::prelude::*;

#[test]
fn completions_bash() {
    Command::new(TestProject::beacon_bin())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("beacon"));
}

#[test]
fn completions_rejects_unknown_shell() {
    Command::new(TestProject::beacon_bin())
        .args(["completions", "tcsh"])
        .assert()
        .failure();
}

#[test]
fn help_lists_subcommands() {
    Command::new(TestProject::beacon_bin())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("cache"))
        .stdout(predicate::str::contains("init"));
}
