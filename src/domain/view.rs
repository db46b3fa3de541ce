//! Active / completed partition of the todo list

use chrono::NaiveDate;
use serde::Serialize;

use super::list::TodoList;
use super::todo::Todo;

/// One row of a grouped view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    /// Position in the full list
    pub position: usize,
    pub todo: &'a Todo,
    /// Overdue as of the date the partition was taken
    pub overdue: bool,
}

/// Counts shown in list footers and the status bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
}

/// The list split by completion flag, each group in list order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition<'a> {
    pub active: Vec<Entry<'a>>,
    pub completed: Vec<Entry<'a>>,
}

/// Splits the list into active and completed groups
pub fn partition(list: &TodoList, today: NaiveDate) -> Partition<'_> {
    let mut result = Partition::default();

    for (position, todo) in list.iter().enumerate() {
        let entry = Entry {
            position,
            todo,
            overdue: todo.is_overdue(today),
        };
        if todo.done {
            result.completed.push(entry);
        } else {
            result.active.push(entry);
        }
    }

    result
}

impl<'a> Partition<'a> {
    pub fn summary(&self) -> Summary {
        Summary {
            total: self.active.len() + self.completed.len(),
            active: self.active.len(),
            completed: self.completed.len(),
            overdue: self.active.iter().filter(|e| e.overdue).count(),
        }
    }

    /// Both groups merged back into list order
    pub fn recombine(&self) -> Vec<&'a Todo> {
        let mut entries: Vec<_> = self.active.iter().chain(&self.completed).collect();
        entries.sort_by_key(|e| e.position);
        entries.into_iter().map(|e| e.todo).collect()
    }
}
