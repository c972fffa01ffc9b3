//! # runcmd Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error types used throughout runcmd. The central
//! value is [`ProcessFailure`], the record built when a child process exits
//! with a non-zero status. It carries every diagnostic field explicitly so a
//! caller can inspect, log, or re-print it without re-running anything.
//!
//! ## Architecture
//!
//! The error system consists of three components:
//! - `RuncmdError`: A custom error enum using `thiserror` for the specific failure kinds
//! - `RunResult<T>`: `Result<T, RuncmdError>` for library calls whose failures callers match on
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for application-level code
//!
//! The error kinds cover:
//! - Invalid options (stream routing overrides, unknown keys)
//! - Child processes that exit non-zero
//! - Children that could not be spawned at all
//! - Configuration errors
//!
//! ## Examples
//!
//! ```rust,no_run
//! use runcmd::common::process::{run, RunOptions};
//! use runcmd::core::error::RuncmdError;
//!
//! match run("false", &[] as &[&str], &RunOptions::default()) {
//!     Ok(output) => println!("{}", output.stdout_text()),
//!     Err(RuncmdError::ProcessFailure(failure)) => {
//!         eprintln!("{} (exit {})", failure, failure.exit_code);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for runcmd.
// No PartialEq: `Spawn` carries an `std::io::Error`.
#[derive(Error, Debug)]
pub enum RuncmdError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    ProcessFailure(#[from] ProcessFailure),

    #[error("Failed to start '{program}'{}: {source}", in_directory(.directory))]
    Spawn {
        program: String,
        /// Working directory the child was to run in, when one was set.
        directory: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn in_directory(directory: &Option<PathBuf>) -> String {
    directory
        .as_ref()
        .map(|dir| format!(" in directory '{}'", dir.display()))
        .unwrap_or_default()
}

/// Record of a child process that exited with a non-zero status.
///
/// Built once by the runner when it observes the exit status and never
/// modified afterwards. Both captures are always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    /// Termination status. Negative values are signal numbers on Unix.
    pub exit_code: i32,
    /// Program name followed by its arguments, in order.
    pub command: Vec<String>,
    /// Everything the child wrote to stdout before exiting.
    pub stdout_capture: Vec<u8>,
    /// Everything the child wrote to stderr before exiting.
    pub stderr_capture: Vec<u8>,
}

impl ProcessFailure {
    pub fn new(
        exit_code: i32,
        command: Vec<String>,
        stdout_capture: Vec<u8>,
        stderr_capture: Vec<u8>,
    ) -> Self {
        Self {
            exit_code,
            command,
            stdout_capture,
            stderr_capture,
        }
    }

    /// Renders `command` as a single line for display.
    pub fn command_line(&self) -> String {
        command_line(&self.command)
    }
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Command '{}' returned non-zero exit status {}",
            self.command_line(),
            self.exit_code
        )
    }
}

impl std::error::Error for ProcessFailure {}

/// Joins an argv vector with spaces, single-quoting arguments that would be
/// ambiguous when read back (empty, whitespace, or quote characters).
pub fn command_line<S: AsRef<str>>(command: &[S]) -> String {
    command
        .iter()
        .map(|arg| {
            let arg = arg.as_ref();
            if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
                format!("'{}'", arg.replace('\'', r"'\''"))
            } else {
                arg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result type for runner operations whose failures callers match on.
pub type RunResult<T> = std::result::Result<T, RuncmdError>;

/// Type alias for Result using anyhow::Error for application-level code.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;
