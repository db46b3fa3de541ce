//! Edit dialog state machine
//!
//! The dialog is either closed or editing exactly one todo. While editing it
//! holds a draft (text and the raw due-date input) that is committed through
//! [`ApplyEdit`] or discarded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::TodoId;
use super::list::{Rejected, TodoList};
use super::todo::{is_blank, parse_due_date, Todo, DUE_DATE_FORMAT};

/// What saving a blank draft does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlankEditPolicy {
    /// Keep the dialog open with the draft intact
    #[default]
    Reject,
    /// Close the dialog and drop the edit
    Discard,
}

/// Anything an edit can be committed into
pub trait ApplyEdit {
    fn apply_edit(
        &mut self,
        id: &TodoId,
        text: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<(), Rejected>;
}

impl ApplyEdit for TodoList {
    fn apply_edit(
        &mut self,
        id: &TodoId,
        text: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<(), Rejected> {
        self.update(id, text, due_date)
    }
}

/// Input field that has focus in the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftField {
    #[default]
    Text,
    DueDate,
}

impl DraftField {
    pub fn next(self) -> Self {
        match self {
            DraftField::Text => DraftField::DueDate,
            DraftField::DueDate => DraftField::Text,
        }
    }
}

/// The in-progress, uncommitted edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub id: TodoId,
    pub text: String,
    /// Raw due-date input; empty means no due date
    pub due_date: String,
    pub field: DraftField,
}

impl Draft {
    fn from_todo(todo: &Todo) -> Self {
        Self {
            id: todo.id.clone(),
            text: todo.text.clone(),
            due_date: todo
                .due_date
                .map(|d| d.format(DUE_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            field: DraftField::Text,
        }
    }

    /// The input the focused field writes to
    pub fn focused_input(&mut self) -> &mut String {
        match self.field {
            DraftField::Text => &mut self.text,
            DraftField::DueDate => &mut self.due_date,
        }
    }
}

/// Keys the dialog reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKey {
    /// Commit the draft and close
    Commit,
    /// Discard the draft and close
    Cancel,
}

/// Result of a save attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Draft committed, dialog closed
    Committed(TodoId),
    /// Blank text under [`BlankEditPolicy::Reject`]; dialog still open
    BlankRejected,
    /// Blank text under [`BlankEditPolicy::Discard`]; dialog closed
    BlankDiscarded,
    /// Due date input did not parse; dialog still open
    InvalidDueDate(String),
    /// The todo no longer exists; dialog closed
    Missing(TodoId),
    /// Nothing was being edited
    NotOpen,
}

impl SaveOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, SaveOutcome::Committed(_))
    }
}

/// Modal edit dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditDialog {
    #[default]
    Closed,
    Editing(Draft),
}

impl EditDialog {
    /// Starts editing a todo, replacing any open draft
    pub fn open(&mut self, todo: &Todo) {
        *self = EditDialog::Editing(Draft::from_todo(todo));
    }

    pub fn is_open(&self) -> bool {
        matches!(self, EditDialog::Editing(_))
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            EditDialog::Editing(draft) => Some(draft),
            EditDialog::Closed => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match self {
            EditDialog::Editing(draft) => Some(draft),
            EditDialog::Closed => None,
        }
    }

    /// Discards the draft; returns true if a draft was open
    pub fn cancel(&mut self) -> bool {
        let was_open = self.is_open();
        *self = EditDialog::Closed;
        was_open
    }

    /// Commits the draft into `target`
    pub fn save<T: ApplyEdit + ?Sized>(
        &mut self,
        target: &mut T,
        policy: BlankEditPolicy,
    ) -> SaveOutcome {
        let draft = match self {
            EditDialog::Editing(draft) => draft,
            EditDialog::Closed => return SaveOutcome::NotOpen,
        };

        if is_blank(&draft.text) {
            return match policy {
                BlankEditPolicy::Reject => SaveOutcome::BlankRejected,
                BlankEditPolicy::Discard => {
                    *self = EditDialog::Closed;
                    SaveOutcome::BlankDiscarded
                }
            };
        }

        let due_date = match parse_due_date(&draft.due_date) {
            Ok(due) => due,
            Err(_) => {
                draft.field = DraftField::DueDate;
                return SaveOutcome::InvalidDueDate(draft.due_date.clone());
            }
        };

        let id = draft.id.clone();
        let outcome = match target.apply_edit(&id, &draft.text, due_date) {
            Ok(()) => SaveOutcome::Committed(id),
            Err(Rejected::NotFound) => SaveOutcome::Missing(id),
            // Text was checked above
            Err(Rejected::BlankText) => SaveOutcome::BlankRejected,
        };

        if outcome != SaveOutcome::BlankRejected {
            *self = EditDialog::Closed;
        }
        outcome
    }

    /// Handles a commit or cancel key; returns the save outcome on commit
    pub fn handle_key<T: ApplyEdit + ?Sized>(
        &mut self,
        key: DialogKey,
        target: &mut T,
        policy: BlankEditPolicy,
    ) -> Option<SaveOutcome> {
        match key {
            DialogKey::Commit => Some(self.save(target, policy)),
            DialogKey::Cancel => {
                self.cancel();
                None
            }
        }
    }
}
