//! The todo store
//!
//! Owns the in-memory [`TodoList`] and the key-value backend it is persisted
//! to. Every successful mutation is written through immediately. Storage
//! problems never fail an operation: they are recorded as [`StoreWarning`]s
//! for the caller to surface, and the in-memory list stays authoritative.
//! While the persisted value cannot be read, saves are skipped so it is never
//! replaced by a list that was built without it.

use chrono::NaiveDate;
use thiserror::Error;

use super::kv::KvStore;
use crate::domain::{ApplyEdit, Rejected, Todo, TodoId, TodoList, TodoRef};

/// Key the list is stored under
pub const TODOS_KEY: &str = "todos";

/// Key a malformed stored value is copied to before it gets overwritten
pub const MALFORMED_KEY: &str = "todos.malformed";

/// Non-fatal storage problems
#[derive(Debug, Error)]
pub enum StoreWarning {
    #[error("Could not read stored todos, starting with an empty list: {0}")]
    Read(String),

    #[error("Stored todos are malformed, starting with an empty list: {0}")]
    Decode(String),

    #[error("Failed to save todos, changes are kept in memory only: {0}")]
    Write(String),
}

/// Encodes the list as a JSON array
pub fn encode(todos: &TodoList) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(todos)
}

/// Decodes a JSON array of todos in any historical shape
pub fn decode(bytes: &[u8]) -> serde_json::Result<TodoList> {
    serde_json::from_slice(bytes)
}

/// A todo list bound to its backend
pub struct TodoStore<S> {
    backend: S,
    todos: TodoList,
    warnings: Vec<StoreWarning>,
    unreadable: bool,
}

impl<S: KvStore> TodoStore<S> {
    /// Opens the store, loading the persisted list
    pub fn open(backend: S) -> Self {
        let mut store = Self {
            backend,
            todos: TodoList::new(),
            warnings: Vec::new(),
            unreadable: false,
        };
        store.load();
        store
    }

    /// Re-reads the persisted list, replacing the in-memory one
    ///
    /// An absent value is an empty list. A value that does not decode is
    /// copied aside under [`MALFORMED_KEY`] and treated as an empty list.
    /// A value that cannot be read at all blocks saving until a later load
    /// reads it.
    pub fn load(&mut self) -> &TodoList {
        self.unreadable = false;
        self.todos = match self.backend.get(TODOS_KEY) {
            Ok(None) => TodoList::new(),
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(todos) => todos,
                Err(e) => {
                    self.warnings.push(StoreWarning::Decode(e.to_string()));
                    if let Err(e) = self.backend.set(MALFORMED_KEY, &bytes) {
                        self.warnings.push(StoreWarning::Write(format!("{:#}", e)));
                    }
                    TodoList::new()
                }
            },
            Err(e) => {
                self.warnings.push(StoreWarning::Read(format!("{:#}", e)));
                self.unreadable = true;
                TodoList::new()
            }
        };
        &self.todos
    }

    /// Writes the current list to the backend; returns false on failure
    pub fn save(&mut self) -> bool {
        if self.unreadable {
            self.warnings.push(StoreWarning::Write(
                "stored todos could not be read, leaving them untouched".to_string(),
            ));
            return false;
        }

        let result = encode(&self.todos)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| self.backend.set(TODOS_KEY, &bytes));

        match result {
            Ok(()) => true,
            Err(e) => {
                self.warnings.push(StoreWarning::Write(format!("{:#}", e)));
                false
            }
        }
    }

    /// Returns the current list
    pub fn todos(&self) -> &TodoList {
        &self.todos
    }

    /// Returns the backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Drains warnings recorded since the last call
    pub fn take_warnings(&mut self) -> Vec<StoreWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Resolves a user reference to an existing todo ID
    pub fn resolve(&self, reference: &TodoRef) -> Option<TodoId> {
        self.todos.resolve(reference)
    }

    /// Appends a new todo
    pub fn add(&mut self, text: &str, due_date: Option<NaiveDate>) -> Result<TodoId, Rejected> {
        let id = self.todos.add(text, due_date)?;
        self.save();
        Ok(id)
    }

    /// Removes a todo by ID
    pub fn remove(&mut self, id: &TodoId) -> Result<Todo, Rejected> {
        let removed = self.todos.remove(id)?;
        self.save();
        Ok(removed)
    }

    /// Removes the todo at a position
    pub fn remove_at(&mut self, position: usize) -> Result<Todo, Rejected> {
        let removed = self.todos.remove_at(position)?;
        self.save();
        Ok(removed)
    }

    /// Flips a todo's done flag, returning the new value
    pub fn toggle(&mut self, id: &TodoId) -> Result<bool, Rejected> {
        let done = self.todos.toggle(id)?;
        self.save();
        Ok(done)
    }

    /// Flips the done flag of the todo at a position
    pub fn toggle_at(&mut self, position: usize) -> Result<bool, Rejected> {
        let done = self.todos.toggle_at(position)?;
        self.save();
        Ok(done)
    }

    /// Replaces a todo's text and due date
    pub fn update(
        &mut self,
        id: &TodoId,
        text: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<(), Rejected> {
        self.todos.update(id, text, due_date)?;
        self.save();
        Ok(())
    }

    /// Replaces text and due date of the todo at a position
    pub fn update_at(
        &mut self,
        position: usize,
        text: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<(), Rejected> {
        self.todos.update_at(position, text, due_date)?;
        self.save();
        Ok(())
    }
}

impl<S: KvStore> ApplyEdit for TodoStore<S> {
    fn apply_edit(
        &mut self,
        id: &TodoId,
        text: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<(), Rejected> {
        self.update(id, text, due_date)
    }
}
