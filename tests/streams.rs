use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

fn infinite_bf() -> &'static str { "+[]" }

#[test]
fn test_stderr_only_for_abort_messages() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("BF_TIMEOUT_MS", "100")
        .arg("read").arg(infinite_bf())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Execution aborted: wall-clock timeout exceeded (100 ms)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_step_limit_aborts() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .args(["read", "--max-steps", "50", infinite_bf()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn test_step_limit_from_env() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("BF_MAX_STEPS", "10")
        .arg("read").arg(infinite_bf())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (10)"));
}

#[test]
fn test_malformed_timeout_env_is_usage_error() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("BF_TIMEOUT_MS", "soon")
        .arg("read").arg("+.")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid value for BF_TIMEOUT_MS: 'soon'"));
}
