use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env_remove("BF_EOF").env_remove("BF_MEMORY").env_remove("BF_MAX_STEPS");
    cmd
}

#[test]
fn test_comment_characters_are_ignored() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("read").arg("add +a+ then print .")
        .assert()
        .success()
        .stdout("\u{2}\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_unmatched_open_bracket_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("read").arg("+[")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("unmatched bracket '['")
                .and(predicate::str::contains("at instruction 1"))
                .and(predicate::str::contains("^")),
        );
}

#[test]
fn test_unmatched_close_bracket_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("read").arg("[]]")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unmatched bracket ']'").and(predicate::str::contains("at instruction 2")));
}

#[test]
fn test_pointer_out_of_bounds_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("read").arg("+.<")
        .assert()
        .code(1)
        // output produced before the failure is still delivered
        .stdout(predicate::str::starts_with("\u{1}"))
        .stderr(predicate::str::contains("pointer out of bounds (ptr=0, op=<)"));
}

#[test]
fn test_eof_error_policy_fails_on_exhausted_input() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["read", "--eof", "error", ",."])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("input exhausted"));
}

#[test]
fn test_eof_policy_from_env() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .env("BF_EOF", "zero")
        .args(["read", "+,."])
        .write_stdin("")
        .assert()
        .success()
        .stdout("\u{0}\n");
}

#[test]
fn test_unknown_eof_policy_is_usage_error() {
    cargo_bin()
        .args(["read", "--eof", "maybe", "+"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("maybe"));
}

#[test]
fn test_zero_memory_is_usage_error() {
    cargo_bin()
        .args(["read", "--memory", "0", "+"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least one cell"));
}
