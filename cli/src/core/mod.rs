//! # runcmd Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the infrastructure shared by the runner and the
//! binary:
//! - `config`: Configuration loading, merging, and validation
//! - `error`: Error types and result aliases
//!
//! ```rust
//! use runcmd::core::config; // For loading configuration
//! use runcmd::core::error::{RuncmdError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
