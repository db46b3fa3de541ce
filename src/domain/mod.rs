//! Domain models for the todo list
//!
//! Contains the core list logic without any I/O concerns.

mod id;
mod todo;
mod list;
mod view;
mod edit;

pub use id::{IdError, TodoId};
pub use todo::{is_blank, parse_due_date, today, DueDateError, Todo, DUE_DATE_FORMAT};
pub use list::{Rejected, TodoList, TodoRef};
pub use view::{partition, Entry, Partition, Summary};
pub use edit::{ApplyEdit, BlankEditPolicy, DialogKey, Draft, DraftField, EditDialog, SaveOutcome};
