//! Todo domain model
//!
//! A todo is one task entry: text, a completion flag and an optional due date.
//! Overdue is derived at render time and never stored.

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use super::id::TodoId;

/// Date format accepted for due dates (ISO 8601 calendar date)
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum DueDateError {
    #[error("Invalid due date '{0}': expected YYYY-MM-DD")]
    Invalid(String),
}

/// Returns true if the text is empty or only whitespace
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Parses a due date as typed by a user
///
/// Empty input means "no due date".
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDate>, DueDateError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(input, DUE_DATE_FORMAT)
        .map(Some)
        .map_err(|_| DueDateError::Invalid(input.to_string()))
}

/// Returns the current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A todo record
///
/// Serialized in the current stored shape. Stored records are read back
/// through [`Todo::from_stored`], which also accepts older shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    /// Stable identifier
    pub id: TodoId,

    /// Human-readable text
    pub text: String,

    /// Completion flag
    pub done: bool,

    /// Optional due date
    #[serde(rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Todo {
    /// Creates a new, not yet completed todo
    pub fn new(id: TodoId, text: impl Into<String>, due_date: Option<NaiveDate>) -> Self {
        Self {
            id,
            text: text.into(),
            done: false,
            due_date,
        }
    }

    /// Creates a todo with a freshly generated ID
    pub fn create(text: impl Into<String>, due_date: Option<NaiveDate>) -> Self {
        let text = text.into();
        let id = TodoId::new(&text, Utc::now());
        Self::new(id, text, due_date)
    }

    /// Returns true if the todo has a due date before `today` and is not done
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => !self.done && due < today,
            None => false,
        }
    }

    /// Decodes one stored element, tolerating every historical shape
    ///
    /// - `"Buy milk"` (bare string)
    /// - `{"text": "Buy milk", "done": false}`
    /// - `{"text": "Buy milk", "done": false, "dueDate": "2024-01-01"}`
    /// - any of the above objects with an `"id"`
    ///
    /// Fields are read one by one; anything missing or of the wrong type is
    /// treated as absent. Returns `None` for elements that are neither a
    /// string nor an object. Records without a usable ID get a legacy one.
    pub fn from_stored(value: serde_json::Value, position: usize) -> Option<Self> {
        match value {
            serde_json::Value::String(text) => {
                let id = TodoId::legacy(&text, position, 0);
                Some(Self::new(id, text, None))
            }
            serde_json::Value::Object(obj) => {
                let text = obj
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();

                let done = obj.get("done").and_then(|v| v.as_bool()).unwrap_or(false);

                let due_date = obj
                    .get("dueDate")
                    .and_then(|v| v.as_str())
                    .and_then(|s| parse_due_date(s).ok().flatten());

                let id = obj
                    .get("id")
                    .and_then(|v| v.as_str())
                    .and_then(|s| s.parse::<TodoId>().ok())
                    .unwrap_or_else(|| TodoId::legacy(&text, position, 0));

                Some(Self {
                    id,
                    text,
                    done,
                    due_date,
                })
            }
            _ => None,
        }
    }
}
