//! # runcmd Process Execution (`common::process`)
//!
//! File: cli/src/common/process.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module runs external commands to completion and captures their
//! standard output and standard error. A child that exits with a non-zero
//! status is reported as a [`ProcessFailure`] carrying the exit code, the
//! command that was run, and both captures.
//!
//! ## Architecture
//!
//! There are two entry points with different failure policies:
//!
//! - **`run`**: Returns every failure to the caller as a `RuncmdError`. A
//!   non-zero exit arrives as `RuncmdError::ProcessFailure`, ready to be
//!   matched on or inspected.
//! - **`run_or_exit`**: Fail-fast wrapper. On a non-zero exit it writes the
//!   failure report to stderr and terminates the current process with status 1.
//!   Option errors and spawn errors are still returned.
//!
//! Both entry points take a [`RunOptions`] value that lists every recognised
//! option. Output routing belongs to the runner: setting `stdout` or `stderr`
//! is rejected with `RuncmdError::InvalidArgument` before anything is spawned.
//!
//! Execution is synchronous. The calling thread blocks until the child exits,
//! and both pipes are drained concurrently so a chatty child cannot stall on a
//! full pipe buffer. There is no timeout: a child that never exits blocks the
//! caller forever.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use runcmd::common::process::{run, RunOptions};
//! use runcmd::core::error::RuncmdError;
//!
//! # fn run_example() -> Result<(), RuncmdError> {
//! let options = RunOptions::default()
//!     .directory("/tmp")
//!     .env("LC_ALL", "C");
//!
//! let output = run("git", &["status", "--short"], &options)?;
//! for line in output.stdout_text().lines() {
//!     println!("changed: {}", line);
//! }
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{command_line, ProcessFailure, RunResult, RuncmdError};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info, warn};

/// Where a caller asked a child stream to go. The runner always captures
/// both streams itself, so any `StreamRoute` in [`RunOptions`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRoute {
    Inherit,
    Null,
    File(PathBuf),
}

impl StreamRoute {
    fn parse(value: &str) -> Self {
        match value {
            "inherit" => StreamRoute::Inherit,
            "null" => StreamRoute::Null,
            path => StreamRoute::File(PathBuf::from(path)),
        }
    }
}

/// Options accepted by [`run`] and [`run_or_exit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Working directory for the child. Defaults to the caller's.
    pub directory: Option<PathBuf>,
    /// Variables set on top of the inherited environment.
    pub environment: BTreeMap<String, String>,
    /// Print the command line before running it and the captures afterwards.
    /// Only [`run_or_exit`] prints.
    pub verbose: bool,
    /// Rejected when set.
    pub stdout: Option<StreamRoute>,
    /// Rejected when set.
    pub stderr: Option<StreamRoute>,
}

impl RunOptions {
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets an option from a `key`/`value` pair, as read from a command line
    /// or any other untyped source.
    ///
    /// Recognised keys are `directory`, `environment` (value `KEY=VALUE`),
    /// `verbose` (`true`/`false`/`1`/`0`/`yes`/`no`), `stdout` and `stderr`.
    /// Any other key fails with `RuncmdError::InvalidArgument`.
    pub fn set(&mut self, key: &str, value: &str) -> RunResult<()> {
        match key {
            "directory" => self.directory = Some(PathBuf::from(value)),
            "environment" => {
                let (name, val) = parse_env_assignment(value)?;
                self.environment.insert(name, val);
            }
            "verbose" => self.verbose = parse_bool(key, value)?,
            "stdout" => self.stdout = Some(StreamRoute::parse(value)),
            "stderr" => self.stderr = Some(StreamRoute::parse(value)),
            other => {
                return Err(RuncmdError::InvalidArgument(format!(
                    "unknown option '{}' (expected one of: directory, environment, verbose, stdout, stderr)",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Fails if the caller tried to take over stdout or stderr.
    pub fn check_stream_routing(&self) -> RunResult<()> {
        if self.stdout.is_some() {
            return Err(RuncmdError::InvalidArgument(
                "cannot use argument stdout, it will be overwritten".to_string(),
            ));
        }
        if self.stderr.is_some() {
            return Err(RuncmdError::InvalidArgument(
                "cannot use argument stderr, it will be overwritten".to_string(),
            ));
        }
        Ok(())
    }
}

/// Splits `KEY=VALUE`. The value may be empty or contain further `=`.
pub fn parse_env_assignment(assignment: &str) -> RunResult<(String, String)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(RuncmdError::InvalidArgument(format!(
            "environment override '{}' must have the form KEY=VALUE",
            assignment
        ))),
    }
}

fn parse_bool(key: &str, value: &str) -> RunResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(RuncmdError::InvalidArgument(format!(
            "option '{}' expects a boolean, got '{}'",
            key, value
        ))),
    }
}

/// Captured streams of a child that exited with status 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Stdout decoded as UTF-8, with invalid sequences replaced.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stderr decoded as UTF-8, with invalid sequences replaced.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Runs `program` with `args` and waits for it to exit.
///
/// Returns both captures when the exit status is 0. A non-zero exit is
/// returned as `RuncmdError::ProcessFailure`. A child that cannot be started
/// at all is `RuncmdError::Spawn`.
pub fn run<S: AsRef<str>>(
    program: &str,
    args: &[S],
    options: &RunOptions,
) -> RunResult<CommandOutput> {
    options.check_stream_routing()?;
    execute(argv(program, args), options)
}

/// Like [`run`], for callers holding a full argv vector whose first element
/// is the program.
pub fn run_command<S: AsRef<str>>(command: &[S], options: &RunOptions) -> RunResult<CommandOutput> {
    let (program, args) = command.split_first().ok_or_else(|| {
        RuncmdError::InvalidArgument("command must name a program to run".to_string())
    })?;
    run(program.as_ref(), args, options)
}

/// Runs `program` like [`run`], but exits the current process with status 1
/// after printing a failure report if the child exits non-zero.
///
/// Option errors and spawn errors are returned, not turned into an exit.
/// With `options.verbose`, the command line is printed to stdout before the
/// child starts, and its captures are printed to stdout after a successful run.
pub fn run_or_exit<S: AsRef<str>>(
    program: &str,
    args: &[S],
    options: &RunOptions,
) -> RunResult<CommandOutput> {
    options.check_stream_routing()?;
    let command = argv(program, args);

    if options.verbose {
        println!("$ {}", command_line(&command));
    }

    match execute(command, options) {
        Ok(output) => {
            if options.verbose {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                if let Err(e) = write_captures(&output.stdout, &output.stderr, &mut handle) {
                    warn!("Failed to echo captured output: {}", e);
                }
            }
            Ok(output)
        }
        Err(RuncmdError::ProcessFailure(failure)) => {
            debug!("Exiting after child failure: {}", failure);
            let stderr = io::stderr();
            let mut handle = stderr.lock();
            if let Err(e) = write_failure_report(&failure, &mut handle) {
                warn!("Failed to write failure report: {}", e);
            }
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}

/// Writes the report printed by [`run_or_exit`]: the summary line, then the
/// captured stdout, then the captured stderr.
///
/// Capture bytes are written unmodified, but the report is not a byte-exact
/// copy: a separator newline follows any non-empty capture that does not end
/// with one, so `printf x` and `echo x` produce the same report. Empty
/// captures are skipped. Use the `ProcessFailure` fields for exact bytes.
pub fn write_failure_report<W: Write>(failure: &ProcessFailure, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", failure)?;
    write_captures(&failure.stdout_capture, &failure.stderr_capture, out)?;
    out.flush()
}

fn write_captures<W: Write>(stdout: &[u8], stderr: &[u8], out: &mut W) -> io::Result<()> {
    for capture in [stdout, stderr] {
        if capture.is_empty() {
            continue;
        }
        out.write_all(capture)?;
        if !capture.ends_with(b"\n") {
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn argv<S: AsRef<str>>(program: &str, args: &[S]) -> Vec<String> {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|a| a.as_ref().to_string()))
        .collect()
}

/// Spawns `command`, drains both pipes and classifies the exit status.
/// Routing has already been checked by the caller.
fn execute(command: Vec<String>, options: &RunOptions) -> RunResult<CommandOutput> {
    let mut cmd = Command::new(&command[0]);
    cmd.args(&command[1..])
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .envs(&options.environment);
    if let Some(dir) = &options.directory {
        cmd.current_dir(dir);
    }

    debug!(
        "Running '{}' (directory: {:?}, {} environment override(s))",
        command_line(&command),
        options.directory,
        options.environment.len()
    );

    // `output()` reads stdout and stderr concurrently until both reach EOF.
    let output = cmd.output().map_err(|source| RuncmdError::Spawn {
        program: command[0].clone(),
        directory: options.directory.clone(),
        source,
    })?;

    let exit_code = exit_code(&output.status);
    debug!(
        "'{}' exited with status {} (stdout: {} bytes, stderr: {} bytes)",
        command[0],
        exit_code,
        output.stdout.len(),
        output.stderr.len()
    );

    if output.status.success() {
        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    } else {
        info!(
            "Command '{}' returned non-zero exit status {}",
            command_line(&command),
            exit_code
        );
        Err(ProcessFailure::new(exit_code, command, output.stdout, output.stderr).into())
    }
}

/// Exit code of a finished child. Signal deaths map to the negated signal
/// number on Unix; anything else without a code maps to -1.
fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
