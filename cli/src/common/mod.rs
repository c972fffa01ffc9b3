//! # runcmd Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared utility modules, kept apart from core infrastructure (`core::`).
//! Currently this is only `process`, the command runner.
//!

/// Running external commands and capturing their output.
pub mod process;
