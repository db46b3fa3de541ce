//! TUI application state and logic

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use super::event::{Event, EventHandler};
use super::views;
use crate::domain::{
    parse_due_date, partition, today, BlankEditPolicy, DialogKey, DraftField, EditDialog, Entry,
    Partition, Rejected, SaveOutcome, Todo, TodoId,
};
use crate::storage::{KvStore, TodoStore, WorkspaceConfig};

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    NewTodo(NewTodo),
    Confirm(ConfirmAction),
    Help,
}

/// Confirmation actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Remove(TodoId),
}

/// Input of the new-todo form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodo {
    pub text: String,
    pub due_date: String,
    pub field: DraftField,
}

impl NewTodo {
    fn focused_input(&mut self) -> &mut String {
        match self.field {
            DraftField::Text => &mut self.text,
            DraftField::DueDate => &mut self.due_date,
        }
    }
}

/// Application state
pub struct App<S> {
    /// The list and its backend
    store: TodoStore<S>,

    /// Edit dialog; owns keyboard input while open
    dialog: EditDialog,

    /// Input mode when the dialog is closed
    input_mode: InputMode,

    /// Selected row among the visible rows
    selected: usize,

    /// Show the completed group
    show_completed: bool,

    blank_edit: BlankEditPolicy,

    /// Date overdue marks are computed against
    today: NaiveDate,

    /// Status message to display
    status_message: Option<String>,

    /// Whether to quit
    should_quit: bool,
}

impl<S: KvStore> App<S> {
    /// Create a new application around an opened store
    pub fn new(store: TodoStore<S>, config: &WorkspaceConfig) -> Self {
        let mut app = Self {
            store,
            dialog: EditDialog::default(),
            input_mode: InputMode::Normal,
            selected: 0,
            show_completed: config.show_completed,
            blank_edit: config.blank_edit,
            today: today(),
            status_message: None,
            should_quit: false,
        };
        app.flush_warnings();
        app
    }

    /// Run the main application loop
    pub fn run<B: Backend>(
        &mut self,
        terminal: &mut ratatui::Terminal<B>,
        events: EventHandler,
    ) -> Result<()> {
        while !self.should_quit() {
            terminal.draw(|frame| self.draw(frame))?;

            match events.next()? {
                Event::Key(key) => self.handle_key(key),
                Event::Resize(_, _) => {} // Terminal handles resize automatically
                Event::Tick => self.today = today(),
            }
        }

        Ok(())
    }

    /// Draw the UI
    pub fn draw(&self, frame: &mut Frame) {
        views::list::draw(frame, self);

        if self.dialog.is_open() {
            views::dialog::draw_edit(frame, self);
        } else {
            match &self.input_mode {
                InputMode::NewTodo(form) => views::dialog::draw_new(frame, form),
                InputMode::Confirm(ConfirmAction::Remove(id)) => {
                    if let Some(todo) = self.store.todos().get(id) {
                        views::dialog::draw_confirm_remove(frame, todo);
                    }
                }
                InputMode::Help => views::dialog::draw_help(frame),
                InputMode::Normal => {}
            }
        }
    }

    /// Handle key events
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.dialog.is_open() {
            self.handle_dialog_key(key);
            return;
        }

        match &self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::NewTodo(_) => self.handle_new_todo_key(key),
            InputMode::Confirm(_) => self.handle_confirm_key(key),
            InputMode::Help => self.input_mode = InputMode::Normal,
        }
    }

    /// Handle keys in normal mode
    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => self.move_selection_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection_up(),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.visible_rows().len().saturating_sub(1);
            }

            // Actions
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.input_mode = InputMode::Confirm(ConfirmAction::Remove(id));
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => self.edit_selected(),
            KeyCode::Char('n') | KeyCode::Char('a') => {
                self.input_mode = InputMode::NewTodo(NewTodo::default());
            }
            KeyCode::Char('r') => self.reload(),

            KeyCode::Char('c') => {
                self.show_completed = !self.show_completed;
                self.clamp_selection();
            }

            KeyCode::Char('?') => {
                self.input_mode = InputMode::Help;
            }

            _ => {}
        }
    }

    /// Handle keys while the edit dialog is open
    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let dialog_key = match key.code {
            KeyCode::Enter => Some(DialogKey::Commit),
            KeyCode::Esc => Some(DialogKey::Cancel),
            _ => None,
        };

        if let Some(dialog_key) = dialog_key {
            let outcome = self
                .dialog
                .handle_key(dialog_key, &mut self.store, self.blank_edit);
            match outcome {
                Some(outcome) => self.report_save(outcome),
                None => self.status_message = Some("Edit cancelled".to_string()),
            }
            self.flush_warnings();
            return;
        }

        let Some(draft) = self.dialog.draft_mut() else {
            return;
        };

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => draft.field = draft.field.next(),
            KeyCode::Backspace => {
                draft.focused_input().pop();
            }
            KeyCode::Char(c) => draft.focused_input().push(c),
            _ => {}
        }
    }

    /// Handle keys in the new-todo form
    fn handle_new_todo_key(&mut self, key: KeyEvent) {
        let InputMode::NewTodo(form) = &mut self.input_mode else {
            return;
        };

        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let form = form.clone();
                self.create_todo(form);
            }
            KeyCode::Tab | KeyCode::BackTab => form.field = form.field.next(),
            KeyCode::Backspace => {
                form.focused_input().pop();
            }
            KeyCode::Char(c) => form.focused_input().push(c),
            _ => {}
        }
    }

    /// Handle keys in confirm mode
    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let InputMode::Confirm(ConfirmAction::Remove(id)) = &self.input_mode {
                    let id = id.clone();
                    self.remove(&id);
                }
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    /// Adds the todo described by the form; the form stays open on rejection
    fn create_todo(&mut self, form: NewTodo) {
        let due_date = match parse_due_date(&form.due_date) {
            Ok(due) => due,
            Err(e) => {
                self.status_message = Some(e.to_string());
                if let InputMode::NewTodo(open) = &mut self.input_mode {
                    open.field = DraftField::DueDate;
                }
                return;
            }
        };

        match self.store.add(&form.text, due_date) {
            Ok(id) => {
                self.input_mode = InputMode::Normal;
                self.select(&id);
                self.status_message = Some(format!("Added: {}", form.text.trim()));
            }
            Err(Rejected::BlankText) => {
                self.status_message = Some("Todo text cannot be blank".to_string());
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
        self.flush_warnings();
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };

        if let Ok(done) = self.store.toggle(&id) {
            let state = if done { "completed" } else { "active" };
            self.status_message = Some(format!("Marked {} as {}", id, state));
            // Follow the todo into its new group when it stays visible
            if done && !self.show_completed {
                self.clamp_selection();
            } else {
                self.select(&id);
            }
        }
        self.flush_warnings();
    }

    fn remove(&mut self, id: &TodoId) {
        if let Ok(removed) = self.store.remove(id) {
            self.status_message = Some(format!("Removed: {}", removed.text));
        }
        self.clamp_selection();
        self.flush_warnings();
    }

    fn edit_selected(&mut self) {
        if let Some(todo) = self.selected_todo() {
            let todo = todo.clone();
            self.dialog.open(&todo);
        }
    }

    /// Re-reads the list from storage
    fn reload(&mut self) {
        self.store.load();
        self.dialog.cancel();
        self.clamp_selection();
        self.status_message = Some("Reloaded".to_string());
        self.flush_warnings();
    }

    fn report_save(&mut self, outcome: SaveOutcome) {
        let message = match outcome {
            SaveOutcome::Committed(id) => {
                self.select(&id);
                "Saved".to_string()
            }
            SaveOutcome::BlankRejected => "Todo text cannot be blank".to_string(),
            SaveOutcome::BlankDiscarded => "Blank edit discarded".to_string(),
            SaveOutcome::InvalidDueDate(input) => {
                format!("Invalid due date '{}', expected YYYY-MM-DD", input)
            }
            SaveOutcome::Missing(id) => {
                self.clamp_selection();
                format!("Todo {} no longer exists", id)
            }
            SaveOutcome::NotOpen => return,
        };
        self.status_message = Some(message);
    }

    /// Moves storage warnings into the status bar
    fn flush_warnings(&mut self) {
        let warnings = self.store.take_warnings();
        if !warnings.is_empty() {
            let joined = warnings
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join(" | ");
            self.status_message = Some(format!("Warning: {}", joined));
        }
    }

    fn move_selection_down(&mut self) {
        let len = self.visible_rows().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn select(&mut self, id: &TodoId) {
        if let Some(row) = self.visible_rows().iter().position(|row| row == id) {
            self.selected = row;
        }
    }

    /// IDs of the rows on screen, active group first
    fn visible_rows(&self) -> Vec<TodoId> {
        let view = self.partition();
        let completed: &[Entry<'_>] = if self.show_completed {
            view.completed.as_slice()
        } else {
            &[]
        };

        view.active
            .iter()
            .chain(completed)
            .map(|entry| entry.todo.id.clone())
            .collect()
    }

    fn selected_id(&self) -> Option<TodoId> {
        self.visible_rows().get(self.selected).cloned()
    }

    // Public accessors for views

    pub fn partition(&self) -> Partition<'_> {
        partition(self.store.todos(), self.today)
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.selected_id().and_then(|id| self.store.todos().get(&id))
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn show_completed(&self) -> bool {
        self.show_completed
    }

    pub fn dialog(&self) -> &EditDialog {
        &self.dialog
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[cfg(test)]
    pub fn store(&self) -> &TodoStore<S> {
        &self.store
    }
}
