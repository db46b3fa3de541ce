//! Ordered todo list
//!
//! List order is insertion order. Every mutation addresses a record by its
//! stable [`TodoId`]; position-based variants exist for callers that only
//! know a position in the full list. Rejected mutations leave the list
//! untouched.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::id::TodoId;
use super::todo::{is_blank, Todo};

/// Why a mutation was a no-op
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Rejected {
    #[error("todo text cannot be blank")]
    BlankText,

    #[error("no such todo")]
    NotFound,
}

/// A reference to a todo as typed by a user: an ID or a 0-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoRef {
    Id(TodoId),
    Position(usize),
}

impl FromStr for TodoRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(position) = s.parse::<usize>() {
            return Ok(TodoRef::Position(position));
        }
        s.parse::<TodoId>()
            .map(TodoRef::Id)
            .map_err(|_| format!("expected a todo ID (t-xxxxxxx) or a position, got '{}'", s))
    }
}

impl fmt::Display for TodoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoRef::Id(id) => write!(f, "{}", id),
            TodoRef::Position(p) => write!(f, "#{}", p),
        }
    }
}

/// The ordered list of todos
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoList(Vec<Todo>);

impl TodoList {
    /// Creates an empty list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a list from records, re-deriving any duplicate IDs
    pub fn from_todos(todos: Vec<Todo>) -> Self {
        let mut list = Self(Vec::with_capacity(todos.len()));
        let mut seen = HashSet::new();

        for (position, mut todo) in todos.into_iter().enumerate() {
            let mut attempt = 1;
            while !seen.insert(todo.id.clone()) {
                todo.id = TodoId::legacy(&todo.text, position, attempt);
                attempt += 1;
            }
            list.0.push(todo);
        }

        list
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over todos in list order
    pub fn iter(&self) -> impl Iterator<Item = &Todo> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Todo] {
        &self.0
    }

    /// Gets a todo by ID
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.0.iter().find(|t| &t.id == id)
    }

    /// Gets the todo at a position
    pub fn get_at(&self, position: usize) -> Option<&Todo> {
        self.0.get(position)
    }

    /// Returns the current position of a todo
    pub fn position_of(&self, id: &TodoId) -> Option<usize> {
        self.0.iter().position(|t| &t.id == id)
    }

    /// Resolves a user reference to the ID of an existing todo
    pub fn resolve(&self, reference: &TodoRef) -> Option<TodoId> {
        match reference {
            TodoRef::Id(id) => self.get(id).map(|t| t.id.clone()),
            TodoRef::Position(p) => self.get_at(*p).map(|t| t.id.clone()),
        }
    }

    /// Appends a new todo; blank text is rejected
    pub fn add(&mut self, text: &str, due_date: Option<NaiveDate>) -> Result<TodoId, Rejected> {
        self.add_at(text, due_date, Utc::now())
    }

    /// Appends a new todo created at the given time
    pub fn add_at(
        &mut self,
        text: &str,
        due_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> Result<TodoId, Rejected> {
        if is_blank(text) {
            return Err(Rejected::BlankText);
        }

        // Same text within the same nanosecond hashes identically
        let mut timestamp = created_at;
        let mut id = TodoId::new(text, timestamp);
        while self.get(&id).is_some() {
            timestamp = timestamp + chrono::Duration::nanoseconds(1);
            id = TodoId::new(text, timestamp);
        }

        self.0.push(Todo::new(id.clone(), text, due_date));
        Ok(id)
    }

    /// Removes a todo by ID
    pub fn remove(&mut self, id: &TodoId) -> Result<Todo, Rejected> {
        let position = self.position_of(id).ok_or(Rejected::NotFound)?;
        Ok(self.0.remove(position))
    }

    /// Removes the todo at a position
    pub fn remove_at(&mut self, position: usize) -> Result<Todo, Rejected> {
        if position >= self.0.len() {
            return Err(Rejected::NotFound);
        }
        Ok(self.0.remove(position))
    }

    /// Flips the done flag, returning the new value
    pub fn toggle(&mut self, id: &TodoId) -> Result<bool, Rejected> {
        let todo = self.0.iter_mut().find(|t| &t.id == id).ok_or(Rejected::NotFound)?;
        todo.done = !todo.done;
        Ok(todo.done)
    }

    /// Flips the done flag of the todo at a position
    pub fn toggle_at(&mut self, position: usize) -> Result<bool, Rejected> {
        let todo = self.0.get_mut(position).ok_or(Rejected::NotFound)?;
        todo.done = !todo.done;
        Ok(todo.done)
    }

    /// Replaces text and due date; `done` is left unchanged
    pub fn update(
        &mut self,
        id: &TodoId,
        text: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<(), Rejected> {
        let position = self.position_of(id).ok_or(Rejected::NotFound)?;
        self.update_at(position, text, due_date)
    }

    /// Replaces text and due date of the todo at a position
    pub fn update_at(
        &mut self,
        position: usize,
        text: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<(), Rejected> {
        if is_blank(text) {
            return Err(Rejected::BlankText);
        }
        let todo = self.0.get_mut(position).ok_or(Rejected::NotFound)?;
        todo.text = text.to_string();
        todo.due_date = due_date;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a Todo;
    type IntoIter = std::slice::Iter<'a, Todo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for TodoList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Always written in the newest shape
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TodoList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{SeqAccess, Visitor};

        struct TodoListVisitor;

        impl<'de> Visitor<'de> for TodoListVisitor {
            type Value = TodoList;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a sequence of todos (strings or objects)")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut todos = Vec::new();
                let mut position = 0;

                while let Some(value) = seq.next_element::<serde_json::Value>()? {
                    if let Some(todo) = Todo::from_stored(value, position) {
                        todos.push(todo);
                        position += 1;
                    }
                }

                Ok(TodoList::from_todos(todos))
            }
        }

        deserializer.deserialize_seq(TodoListVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn list_of(texts: &[&str]) -> TodoList {
        let mut list = TodoList::new();
        for text in texts {
            list.add(text, None).unwrap();
        }
        list
    }

    #[test]
    fn add_appends_open_todo() {
        let mut list = TodoList::new();
        let id = list.add("Buy milk", Some(date("2024-01-01"))).unwrap();

        assert_eq!(list.len(), 1);
        let todo = list.get(&id).unwrap();
        assert_eq!(todo.text, "Buy milk");
        assert!(!todo.done);
        assert_eq!(todo.due_date, Some(date("2024-01-01")));
    }

    #[test]
    fn add_keeps_text_as_given() {
        let mut list = TodoList::new();
        let id = list.add("  padded  ", None).unwrap();
        assert_eq!(list.get(&id).unwrap().text, "  padded  ");
    }

    #[test]
    fn add_rejects_blank_text() {
        let mut list = TodoList::new();
        assert_eq!(list.add("", None), Err(Rejected::BlankText));
        assert_eq!(list.add("   ", None), Err(Rejected::BlankText));
        assert!(list.is_empty());
    }

    #[test]
    fn add_same_text_same_instant_gets_distinct_ids() {
        let mut list = TodoList::new();
        let now = Utc::now();
        let a = list.add_at("Same", None, now).unwrap();
        let b = list.add_at("Same", None, now).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn toggle_flips_only_target() {
        let mut list = list_of(&["a", "b", "c"]);
        let before = list.clone();

        assert_eq!(list.toggle_at(1), Ok(true));
        assert!(!list.get_at(0).unwrap().done);
        assert!(list.get_at(1).unwrap().done);
        assert!(!list.get_at(2).unwrap().done);

        assert_eq!(list.toggle_at(1), Ok(false));
        assert_eq!(list, before);
    }

    #[test]
    fn toggle_by_id() {
        let mut list = list_of(&["a", "b"]);
        let id = list.get_at(1).unwrap().id.clone();
        assert_eq!(list.toggle(&id), Ok(true));
        assert!(list.get(&id).unwrap().done);
    }

    #[test]
    fn out_of_range_is_a_noop() {
        let mut list = list_of(&["a"]);
        let before = list.clone();

        assert_eq!(list.toggle_at(5), Err(Rejected::NotFound));
        assert_eq!(list.remove_at(1).map(|_| ()), Err(Rejected::NotFound));
        assert_eq!(list.update_at(7, "x", None), Err(Rejected::NotFound));
        assert_eq!(list, before);
    }

    #[test]
    fn remove_shifts_later_positions() {
        let mut list = list_of(&["a", "b", "c"]);
        let removed = list.remove_at(1).unwrap();

        assert_eq!(removed.text, "b");
        assert_eq!(list.len(), 2);
        assert_eq!(list.get_at(0).unwrap().text, "a");
        assert_eq!(list.get_at(1).unwrap().text, "c");
    }

    #[test]
    fn remove_by_id_targets_duplicate_correctly() {
        let mut list = list_of(&["same", "same"]);
        let second = list.get_at(1).unwrap().id.clone();
        list.toggle(&second).unwrap();

        list.remove(&second).unwrap();
        assert_eq!(list.len(), 1);
        assert!(!list.get_at(0).unwrap().done);
    }

    #[test]
    fn update_replaces_text_and_due_keeps_done() {
        let mut list = list_of(&["a"]);
        let id = list.get_at(0).unwrap().id.clone();
        list.toggle(&id).unwrap();

        list.update(&id, "b", Some(date("2024-05-05"))).unwrap();
        let todo = list.get(&id).unwrap();
        assert_eq!(todo.text, "b");
        assert_eq!(todo.due_date, Some(date("2024-05-05")));
        assert!(todo.done);

        list.update(&id, "c", None).unwrap();
        assert_eq!(list.get(&id).unwrap().due_date, None);
    }

    #[test]
    fn update_rejects_blank_text() {
        let mut list = list_of(&["a"]);
        let id = list.get_at(0).unwrap().id.clone();
        assert_eq!(list.update(&id, "  ", None), Err(Rejected::BlankText));
        assert_eq!(list.get(&id).unwrap().text, "a");
    }

    #[test]
    fn resolve_reference() {
        let list = list_of(&["a", "b"]);
        let id = list.get_at(1).unwrap().id.clone();

        assert_eq!(list.resolve(&TodoRef::Position(1)), Some(id.clone()));
        assert_eq!(list.resolve(&TodoRef::Id(id.clone())), Some(id));
        assert_eq!(list.resolve(&TodoRef::Position(2)), None);
        assert_eq!(list.resolve(&TodoRef::Id("t-0000000".parse().unwrap())), None);
    }

    #[test]
    fn todo_ref_parsing() {
        assert_eq!("3".parse::<TodoRef>(), Ok(TodoRef::Position(3)));
        assert_eq!(
            "t-1234567".parse::<TodoRef>(),
            Ok(TodoRef::Id("t-1234567".parse().unwrap()))
        );
        assert!("-1".parse::<TodoRef>().is_err());
        assert!("milk".parse::<TodoRef>().is_err());
    }

    #[test]
    fn end_to_end_scenario() {
        let mut list = TodoList::new();
        list.add("Buy milk", Some(date("2024-01-01"))).unwrap();

        let todo = list.get_at(0).unwrap();
        assert_eq!(todo.text, "Buy milk");
        assert!(!todo.done);
        assert_eq!(todo.due_date, Some(date("2024-01-01")));

        list.toggle_at(0).unwrap();
        assert!(list.get_at(0).unwrap().done);

        list.remove_at(0).unwrap();
        assert!(list.is_empty());
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    #[test]
    fn decodes_mixed_historical_shapes() {
        let list: TodoList = serde_json::from_value(json!([
            "old style",
            {"text": "middle", "done": true},
            {"text": "new", "done": false, "dueDate": "2024-01-01"},
            7,
        ]))
        .unwrap();

        assert_eq!(list.len(), 3);
        assert_eq!(list.get_at(0).unwrap().text, "old style");
        assert!(list.get_at(1).unwrap().done);
        assert_eq!(list.get_at(2).unwrap().due_date, Some(date("2024-01-01")));
    }

    #[test]
    fn identical_legacy_records_get_distinct_ids() {
        let list: TodoList =
            serde_json::from_value(json!([{"text": "x"}, {"text": "x"}])).unwrap();
        assert_ne!(list.get_at(0).unwrap().id, list.get_at(1).unwrap().id);
    }

    #[test]
    fn duplicate_stored_ids_are_rederived() {
        let list: TodoList = serde_json::from_value(json!([
            {"id": "t-1234567", "text": "a"},
            {"id": "t-1234567", "text": "b"},
        ]))
        .unwrap();

        assert_eq!(list.get_at(0).unwrap().id.to_string(), "t-1234567");
        assert_ne!(list.get_at(1).unwrap().id, list.get_at(0).unwrap().id);
    }

    #[test]
    fn rejects_non_array() {
        assert!(serde_json::from_value::<TodoList>(json!({"text": "x"})).is_err());
        assert!(serde_json::from_str::<TodoList>("not json").is_err());
    }

    #[test]
    fn roundtrip_preserves_order_and_fields() {
        let mut list = list_of(&["a", "b", "c"]);
        list.toggle_at(1).unwrap();
        let id = list.get_at(2).unwrap().id.clone();
        list.update(&id, "c", Some(date("2030-12-31"))).unwrap();

        let json = serde_json::to_string(&list).unwrap();
        let loaded: TodoList = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, list);
    }
}
