//! # runcmd Library Root
//!
//! File: cli/src/lib.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! runcmd runs an external command, waits for it, and hands back everything it
//! wrote to stdout and stderr. A non-zero exit becomes a structured
//! `ProcessFailure` instead of a bare status code.
//!
//! ## Architecture
//!
//! - `common::process`: The runner (`run`, `run_command`, `run_or_exit`) and its options
//! - `core::error`: `RuncmdError`, `ProcessFailure`, and the result aliases
//! - `core::config`: Default options loaded from `.runcmd.toml` / the user config file
//!
//! The `runcmd` binary (`main.rs`) is a thin command-line front end over
//! `run_or_exit`.
//!
pub mod common; // Shared utilities (process execution)
pub mod core; // Core infrastructure (errors, config)
