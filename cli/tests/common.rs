//! # runcmd Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration test files in `cli/tests/`. Each test
//! file declares `mod common;` and runs the compiled `runcmd` binary through
//! `assert_cmd`.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::Path;

/// # Get runcmd Command (`runcmd_cmd`)
///
/// Creates an `assert_cmd::Command` for the compiled `runcmd` binary with
/// `RUST_LOG` and `RUNCMD_CONFIG` cleared and `HOME`/`XDG_CONFIG_HOME`
/// pointed at a directory that does not exist, so log lines and the
/// developer's own user config file do not leak into assertions.
///
/// ## Panics
/// Panics if the `runcmd` binary cannot be found via `Command::cargo_bin`.
pub fn runcmd_cmd() -> Command {
    let empty_home = std::env::temp_dir().join("runcmd-tests-no-such-home");
    with_home(&empty_home)
}

/// Like [`runcmd_cmd`], with `HOME` and `XDG_CONFIG_HOME` (`<home>/.config`)
/// set to `home`.
pub fn with_home(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("runcmd").expect("Failed to find runcmd binary for testing");
    cmd.env_remove("RUST_LOG")
        .env_remove("RUNCMD_CONFIG")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

/// Like [`runcmd_cmd`], with configuration discovery switched off.
pub fn isolated_cmd() -> Command {
    let mut cmd = runcmd_cmd();
    cmd.arg("--no-config");
    cmd
}
