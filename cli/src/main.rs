//! # runcmd Main Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This file is the entry point for the `runcmd` binary. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Building `RunOptions` from configuration files and flags
//! - Running the child through the fail-fast entry point (`run_or_exit`)
//!
//! ## Examples
//!
//! ```bash
//! # Run a command; its stdout/stderr are passed through after it exits
//! runcmd -- git status --short
//!
//! # Run in another directory with an extra variable, echoing the command line
//! runcmd --echo -C /tmp -e LC_ALL=C -- ls -l
//!
//! # Debug logging of the spawn and exit status
//! runcmd -vv -- make test
//! ```
//!
//! Exit status:
//! - `0`: the child exited with status 0
//! - `1`: the child exited non-zero (a failure report is printed to stderr),
//!   or runcmd itself failed (bad option, missing program, bad config)
//!
use anyhow::Context;
use clap::Parser;
use runcmd::common::process::{parse_env_assignment, run_or_exit, RunOptions};
use runcmd::core::config::{self, Config};
use runcmd::core::error::Result;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Defines the command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "runcmd",
    about = "Run a command, capture its output, and report non-zero exits",
    long_about = "Runs COMMAND to completion with stdout and stderr captured.\n\
                  On success the captures are written to runcmd's own stdout/stderr.\n\
                  On a non-zero exit a failure report (command, exit status, stdout,\n\
                  stderr) is written to stderr and runcmd exits with status 1.",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Read default options from this file instead of .runcmd.toml / the user config.
    #[arg(long, value_name = "FILE", env = "RUNCMD_CONFIG", conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore all configuration files.
    #[arg(long)]
    no_config: bool,

    /// Working directory for the command.
    #[arg(short = 'C', long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Set an environment variable for the command (repeatable).
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_arg)]
    env: Vec<(String, String)>,

    /// Set a runner option by name (repeatable): directory, environment, verbose.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,

    /// Print the command line before running it and the captured output afterwards.
    #[arg(long)]
    echo: bool,

    /// The program to run, followed by its arguments.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    command: Vec<String>,
}

fn parse_env_arg(s: &str) -> std::result::Result<(String, String), String> {
    parse_env_assignment(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = execute(cli) {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn execute(cli: Cli) -> Result<()> {
    let options = build_options(&cli)?;
    let (program, args) = cli
        .command
        .split_first()
        .context("No command given")?;

    let output = run_or_exit(program, args, &options)?;

    // With --echo the runner has already printed the captures.
    if !options.verbose {
        io::stdout()
            .write_all(&output.stdout)
            .context("Failed to write captured stdout")?;
        io::stderr()
            .write_all(&output.stderr)
            .context("Failed to write captured stderr")?;
    }
    Ok(())
}

/// Configuration first, then flags on top.
fn build_options(cli: &Cli) -> Result<RunOptions> {
    let config = if cli.no_config {
        Config::default()
    } else if let Some(path) = &cli.config {
        config::load_config_file(path)?
    } else {
        config::load_config()?
    };

    let mut options = RunOptions::default();
    config.apply_to(&mut options);

    if let Some(dir) = &cli.directory {
        options.directory = Some(dir.clone());
    }
    for (key, value) in &cli.env {
        options.environment.insert(key.clone(), value.clone());
    }
    for option in &cli.options {
        let (key, value) = option
            .split_once('=')
            .with_context(|| format!("Option '{}' must have the form KEY=VALUE", option))?;
        options.set(key, value)?;
    }
    if cli.echo {
        options.verbose = true;
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trailing_command() {
        let cli = Cli::try_parse_from(["runcmd", "-v", "--", "ls", "-la", "/tmp"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.command, vec!["ls", "-la", "/tmp"]);

        let cli = Cli::try_parse_from(["runcmd", "echo", "-n", "hi"]).unwrap();
        assert_eq!(cli.command, vec!["echo", "-n", "hi"]);
    }

    #[test]
    fn test_command_is_required() {
        assert!(Cli::try_parse_from(["runcmd"]).is_err());
    }

    #[test]
    fn test_env_flag_parsing() {
        let cli = Cli::try_parse_from(["runcmd", "-e", "A=1", "--env", "B=x=y", "--", "true"])
            .unwrap();
        assert_eq!(
            cli.env,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "x=y".to_string())
            ]
        );
        assert!(Cli::try_parse_from(["runcmd", "-e", "NOPE", "--", "true"]).is_err());
    }

    #[test]
    fn test_build_options_flags_over_config() {
        let cli = Cli::try_parse_from([
            "runcmd",
            "--no-config",
            "-C",
            "/tmp",
            "-e",
            "A=1",
            "-o",
            "environment=B=2",
            "--echo",
            "--",
            "true",
        ])
        .unwrap();
        let options = build_options(&cli).unwrap();
        assert_eq!(options.directory, Some(PathBuf::from("/tmp")));
        assert_eq!(options.environment["A"], "1");
        assert_eq!(options.environment["B"], "2");
        assert!(options.verbose);
    }

    #[test]
    fn test_build_options_rejects_unknown_option() {
        let cli =
            Cli::try_parse_from(["runcmd", "--no-config", "-o", "shell=1", "--", "true"]).unwrap();
        assert!(build_options(&cli).is_err());

        let cli =
            Cli::try_parse_from(["runcmd", "--no-config", "-o", "verbose", "--", "true"]).unwrap();
        assert!(build_options(&cli).is_err());
    }
}
