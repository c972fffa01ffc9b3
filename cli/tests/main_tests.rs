//! # runcmd CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Verifies the top-level behavior of the `runcmd` binary: `--help`,
//! `--version`, and argument errors.
//!

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_help_flag() {
    runcmd_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("COMMAND"));
}

#[test]
fn test_version_flag() {
    runcmd_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// No command at all is a usage error from clap (status 2), not a run failure.
#[test]
fn test_missing_command() {
    runcmd_cmd().assert().failure().code(2);
}

#[test]
fn test_malformed_env_flag() {
    isolated_cmd()
        .args(["-e", "NOEQUALS", "--", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}
