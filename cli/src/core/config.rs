//! # runcmd Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module loads default run options from TOML files so that a project
//! can pin a working directory, environment overrides, or verbosity without
//! repeating them on every invocation.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.runcmd.toml` in current directory or ancestors (search stops at a `.git` directory)
//! 2. User-specific `config.toml` in the platform config directory (e.g. `~/.config/runcmd/`)
//! 3. Default values defined in the code
//!
//! Unknown keys are rejected at parse time (`deny_unknown_fields`), `~` in
//! `defaults.directory` is expanded, a relative directory is taken relative to
//! the file that names it, and a configured directory must exist.
//!
//! ## Examples
//!
//! ```toml
//! [defaults]
//! verbose = true
//! directory = "~/src/project"
//!
//! [environment]
//! LC_ALL = "C"
//! ```
//!
//! ```rust,no_run
//! use runcmd::common::process::RunOptions;
//! use runcmd::core::config;
//!
//! # fn run_example() -> anyhow::Result<()> {
//! let cfg = config::load_config()?;
//! let mut options = RunOptions::default();
//! cfg.apply_to(&mut options);
//! # Ok(())
//! # }
//! ```
//!
use crate::common::process::RunOptions;
use crate::core::error::{Result, RuncmdError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Variables set on top of the inherited environment.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

/// Default values for [`RunOptions`].
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Echo the command line and captures.
    pub verbose: Option<bool>,
    /// Working directory (can use ~). Will be expanded.
    pub directory: Option<String>,
}

impl Config {
    /// Seeds `options` with the configured defaults. Values already present
    /// in `options.environment` are kept.
    pub fn apply_to(&self, options: &mut RunOptions) {
        if let Some(verbose) = self.defaults.verbose {
            options.verbose = verbose;
        }
        if let Some(dir) = &self.defaults.directory {
            options.directory = Some(PathBuf::from(dir));
        }
        for (key, value) in &self.environment {
            options
                .environment
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".runcmd.toml";

pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    finish_config(merged_config)
}

/// Loads a single explicitly named file, skipping user/project discovery.
pub fn load_config_file(path: &Path) -> Result<Config> {
    info!("Loading configuration from: {}", path.display());
    finish_config(load_config_from_path(path)?)
}

fn finish_config(mut config: Config) -> Result<Config> {
    expand_config_paths(&mut config).context("Failed to expand paths in configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "runcmd", "runcmd") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.runcmd.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

/// Reads and parses one file. A relative `defaults.directory` is taken
/// relative to the directory holding the file.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let mut config: Config = toml::from_str(&content).map_err(|e| {
        anyhow!(RuncmdError::Config(format!(
            "Failed to parse {}: {}",
            path.display(),
            e
        )))
    })?;
    if let Some(base) = path.parent() {
        resolve_directory(&mut config, base);
    }
    Ok(config)
}

fn resolve_directory(config: &mut Config, base: &Path) {
    if let Some(dir) = &mut config.defaults.directory {
        let expanded = PathBuf::from(shellexpand::tilde(dir.as_str()).into_owned());
        if expanded.is_relative() {
            let resolved = base.join(expanded);
            debug!("Resolved relative directory '{}' to {}", dir, resolved.display());
            *dir = resolved.to_string_lossy().into_owned();
        }
    }
}

/// Project values win; environment tables are merged key by key.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let Some(project_cfg) = project else {
        return user;
    };
    let mut merged = user;
    merged.defaults.verbose = project_cfg.defaults.verbose.or(merged.defaults.verbose);
    merged.defaults.directory = project_cfg.defaults.directory.or(merged.defaults.directory);
    merged.environment.extend(project_cfg.environment);
    merged
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    if let Some(dir) = &mut config.defaults.directory {
        *dir = shellexpand::tilde(dir.as_str()).into_owned();
        debug!("Expanded default directory: {}", dir);
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    if let Some(dir) = &config.defaults.directory {
        let dir = PathBuf::from(dir);
        if !dir.exists() {
            return Err(anyhow!(RuncmdError::Config(format!(
                "Configured directory '{}' does not exist.",
                dir.display()
            ))));
        }
        if !dir.is_dir() {
            return Err(anyhow!(RuncmdError::Config(format!(
                "Configured path '{}' exists but is not a directory.",
                dir.display()
            ))));
        }
    }
    for key in config.environment.keys() {
        if key.is_empty() || key.contains('=') {
            return Err(anyhow!(RuncmdError::Config(format!(
                "Invalid environment variable name: '{}'.",
                key
            ))));
        }
    }
    Ok(())
}
