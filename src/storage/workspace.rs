//! Workspace resolution
//!
//! A workspace is the directory holding the todo store and its config.
//! It is resolved in order from an explicit directory (`--dir` or
//! `TODO_DIR`), a `.todo/` directory in the current directory or a parent,
//! and finally the per-user data directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use thiserror::Error;

use super::config::{Config, CONFIG_FILE};
use super::kv::FileKvStore;
use super::store::TodoStore;

/// Name of a local workspace directory
pub const WORKSPACE_DIR: &str = ".todo";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Could not determine a data directory for todos; pass --dir or set TODO_DIR")]
    NoDataDir,

    #[error("Workspace path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// How a workspace was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Given with `--dir` / `TODO_DIR`
    Explicit,
    /// A `.todo/` directory found from the current directory
    Local,
    /// The per-user data directory
    User,
}

/// A resolved workspace
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    location: Location,
    config: Config,
}

impl Workspace {
    /// Opens the workspace stored in `dir`
    ///
    /// The directory does not need to exist yet; it is created on first save.
    pub fn open(dir: impl Into<PathBuf>, location: Location) -> Result<Self> {
        let dir = dir.into();
        if dir.exists() && !dir.is_dir() {
            return Err(WorkspaceError::NotADirectory(dir).into());
        }

        let config = Config::load(&dir)?;
        Ok(Self {
            dir,
            location,
            config,
        })
    }

    /// Resolves the workspace starting from the current directory
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::locate_from(explicit, &cwd)
    }

    /// Resolves the workspace starting from `start`
    pub fn locate_from(explicit: Option<&Path>, start: &Path) -> Result<Self> {
        if let Some(dir) = explicit {
            return Self::open(dir, Location::Explicit);
        }

        if let Some(dir) = Self::find_local(start) {
            return Self::open(dir, Location::Local);
        }

        let dir = Self::user_data_dir().ok_or(WorkspaceError::NoDataDir)?;
        Self::open(dir, Location::User)
    }

    /// Finds a `.todo/` directory in `start` or one of its parents
    pub fn find_local(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(WORKSPACE_DIR);
            if candidate.is_dir() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the per-user data directory
    pub fn user_data_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "todo", "todo-cli").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Initializes a local workspace under `root`
    pub fn init(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().join(WORKSPACE_DIR);

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {} directory: {}", WORKSPACE_DIR, dir.display()))?;

        // Create default config
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            let default_config = r#"# Todo CLI workspace configuration

# What saving a blank edit does: "reject" keeps the dialog open,
# "discard" closes it and drops the edit
blank_edit = "reject"

# Show completed todos when the TUI starts
show_completed = true
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        // Create .gitignore for the workspace
        let gitignore_path = dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Ignore lock files and interrupted writes
*.lock
.tmp*

# Ignore copies of unreadable data
todos.malformed.json
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(dir, Location::Local)
    }

    /// Returns the directory holding the store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns how the workspace was found
    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens the todo store of this workspace
    pub fn store(&self) -> TodoStore<FileKvStore> {
        TodoStore::open(FileKvStore::new(&self.dir))
    }
}
