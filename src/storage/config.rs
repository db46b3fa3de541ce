//! Configuration handling for Todo CLI
//!
//! Configuration is stored in `config.toml` next to the todo store
//! (workspace) and in `~/.config/todo/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::BlankEditPolicy;

/// File name of both config files
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Workspace-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// What saving a blank edit does (`reject` keeps the dialog open)
    pub blank_edit: BlankEditPolicy,

    /// Show the completed group when the TUI starts
    pub show_completed: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            blank_edit: BlankEditPolicy::Reject,
            show_completed: true,
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// TUI event poll interval in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Text,
            tick_rate_ms: 250,
        }
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + workspace)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub global: GlobalConfig,
}

impl Config {
    /// Loads the global config and the config stored in `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            workspace: Self::load_workspace_config(dir)?,
            global: Self::load_global()?,
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "todo", "todo-cli").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        match Self::global_config_dir() {
            Some(dir) => read_toml(&dir.join(CONFIG_FILE), "global"),
            None => Ok(GlobalConfig::default()),
        }
    }

    /// Loads workspace configuration from a store directory
    fn load_workspace_config(dir: &Path) -> Result<WorkspaceConfig> {
        read_toml(&dir.join(CONFIG_FILE), "workspace")
    }
}

/// Reads a TOML config file, falling back to defaults when it is missing
fn read_toml<T>(path: &Path, which: &str) -> Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} config: {}", which, path.display()))?;

    toml::from_str(&content)
        .map_err(|e| ConfigError::Parse(e.to_string()))
        .with_context(|| format!("Failed to parse {} config: {}", which, path.display()))
}
