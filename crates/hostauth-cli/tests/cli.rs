use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_mentions_the_service_flag() {
    Command::cargo_bin("hostauth")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--service"));
}

#[test]
fn missing_username_is_a_usage_error() {
    Command::cargo_bin("hostauth")
        .expect("binary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
