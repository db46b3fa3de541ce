//! Todo CLI - A local-first todo list for the terminal
//!
//! Todos live in an ordered list persisted as a JSON array under the
//! `todos` key of a key-value store. The list can be driven from the
//! command line or from an interactive terminal UI with an edit dialog.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{EditDialog, Todo, TodoId, TodoList, TodoRef};
pub use storage::{FileKvStore, KvStore, MemoryKvStore, TodoStore};
