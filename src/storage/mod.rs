//! # Storage Layer
//!
//! Persistence for the todo list.
//!
//! ## Storage Format
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Todos | JSON array under key `todos` | `{workspace}/todos.json` |
//! | Config | TOML | `{workspace}/config.toml`, `~/.config/todo/config.toml` |
//!
//! ## Persistence Policy
//!
//! - [`TodoStore`] writes through after every successful mutation
//! - Absent or malformed stored data loads as an empty list
//! - Failed writes never undo an in-memory change; they surface as
//!   [`StoreWarning`]s
//! - [`FileKvStore`] locks files (`fs2`) and writes atomically (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Workspace`] - Resolves where the store lives
//! - [`TodoStore`] - The list plus its backend
//! - [`KvStore`] - Key-value byte store abstraction
//! - [`Config`] - Workspace and global configuration

mod kv;
mod store;
mod config;
mod workspace;

pub use kv::{FileKvStore, KvStore, MemoryKvStore};
pub use store::{decode, encode, StoreWarning, TodoStore, MALFORMED_KEY, TODOS_KEY};
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, WorkspaceConfig};
pub use workspace::{Location, Workspace, WorkspaceError, WORKSPACE_DIR};
