//! Todo CLI commands

use anyhow::Result;
use chrono::NaiveDate;

use super::output::Output;
use crate::domain::{
    partition, today, EditDialog, Entry, Rejected, SaveOutcome, Todo, TodoRef, DUE_DATE_FORMAT,
};
use crate::storage::{FileKvStore, TodoStore, Workspace};

/// JSON shape of a single todo
fn todo_json(position: usize, todo: &Todo, overdue: bool) -> serde_json::Value {
    serde_json::json!({
        "position": position,
        "id": todo.id.to_string(),
        "text": todo.text,
        "done": todo.done,
        "dueDate": todo.due_date.map(|d| d.format(DUE_DATE_FORMAT).to_string()),
        "overdue": overdue,
    })
}

fn entry_json(entry: &Entry<'_>) -> serde_json::Value {
    todo_json(entry.position, entry.todo, entry.overdue)
}

/// Formats one row of the text listing
fn entry_line(entry: &Entry<'_>) -> String {
    let check = if entry.todo.done { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{:>3}  {}  {} {}",
        entry.position, entry.todo.id, check, entry.todo.text
    );

    if let Some(due) = entry.todo.due_date {
        line.push_str(&format!("  (due {}", due.format(DUE_DATE_FORMAT)));
        if entry.overdue {
            line.push_str(", OVERDUE");
        }
        line.push(')');
    }

    line
}

/// Prints and clears warnings the store collected
fn flush_warnings(store: &mut TodoStore<FileKvStore>, output: &Output) {
    output.store_warnings(store.take_warnings());
}

pub fn add(
    workspace: &Workspace,
    output: &Output,
    text: &str,
    due_date: Option<NaiveDate>,
) -> Result<()> {
    let mut store = workspace.store();
    flush_warnings(&mut store, output);

    output.verbose_ctx("add", &format!("Adding {:?} (due: {:?})", text, due_date));

    let result = store.add(text, due_date);
    flush_warnings(&mut store, output);

    match result {
        Ok(id) => {
            let position = store.todos().position_of(&id).unwrap_or_default();
            if output.is_json() {
                if let Some(todo) = store.todos().get(&id) {
                    output.data(&todo_json(position, todo, todo.is_overdue(today())));
                }
            } else {
                output.success(&format!("Added {} at position {}", id, position));
            }
        }
        Err(Rejected::BlankText) => output.warn("Todo text cannot be blank; nothing added"),
        Err(e) => output.warn(&e.to_string()),
    }

    Ok(())
}

pub fn list(
    workspace: &Workspace,
    output: &Output,
    show_active: bool,
    show_completed: bool,
) -> Result<()> {
    let mut store = workspace.store();
    flush_warnings(&mut store, output);

    let view = partition(store.todos(), today());
    let summary = view.summary();

    output.verbose_ctx(
        "list",
        &format!(
            "{} todos ({} active, {} completed)",
            summary.total, summary.active, summary.completed
        ),
    );

    if output.is_json() {
        let mut data = serde_json::Map::new();
        if show_active {
            data.insert(
                "active".to_string(),
                view.active.iter().map(entry_json).collect(),
            );
        }
        if show_completed {
            data.insert(
                "completed".to_string(),
                view.completed.iter().map(entry_json).collect(),
            );
        }
        data.insert("summary".to_string(), serde_json::to_value(summary)?);
        output.data(&data);
        return Ok(());
    }

    if summary.total == 0 {
        println!("No todos yet. Add one with: todo add \"<text>\"");
        return Ok(());
    }

    if show_active {
        println!("Active ({})", view.active.len());
        for entry in &view.active {
            println!("{}", entry_line(entry));
        }
    }

    if show_active && show_completed {
        println!();
    }

    if show_completed {
        println!("Completed ({})", view.completed.len());
        for entry in &view.completed {
            println!("{}", entry_line(entry));
        }
    }

    println!();
    let mut footer = format!(
        "{} todos: {} active, {} completed",
        summary.total, summary.active, summary.completed
    );
    if summary.overdue > 0 {
        footer.push_str(&format!(", {} overdue", summary.overdue));
    }
    println!("{}", footer);

    Ok(())
}

pub fn toggle(workspace: &Workspace, output: &Output, target: &TodoRef) -> Result<()> {
    let mut store = workspace.store();
    flush_warnings(&mut store, output);

    let Some(id) = store.resolve(target) else {
        output.warn(&format!("No todo matches {}; nothing changed", target));
        return Ok(());
    };

    output.verbose_ctx("toggle", &format!("Resolved {} to {}", target, id));

    let result = store.toggle(&id);
    flush_warnings(&mut store, output);

    match result {
        Ok(done) => {
            let state = if done { "completed" } else { "active" };
            if output.is_json() {
                output.data(&serde_json::json!({
                    "id": id.to_string(),
                    "done": done,
                }));
            } else {
                output.success(&format!("Marked {} as {}", id, state));
            }
        }
        Err(e) => output.warn(&format!("{}: {}", target, e)),
    }

    Ok(())
}

pub fn remove(workspace: &Workspace, output: &Output, target: &TodoRef) -> Result<()> {
    let mut store = workspace.store();
    flush_warnings(&mut store, output);

    let Some(id) = store.resolve(target) else {
        output.warn(&format!("No todo matches {}; nothing removed", target));
        return Ok(());
    };

    let result = store.remove(&id);
    flush_warnings(&mut store, output);

    match result {
        Ok(removed) => {
            if output.is_json() {
                output.data(&serde_json::json!({
                    "id": removed.id.to_string(),
                    "text": removed.text,
                    "removed": true,
                }));
            } else {
                output.success(&format!("Removed {}: {}", removed.id, removed.text));
            }
        }
        Err(e) => output.warn(&format!("{}: {}", target, e)),
    }

    Ok(())
}

/// Edits a todo with the same rules as the interactive dialog
///
/// `due_date` is `None` to keep the current date, `Some(None)` to clear it.
pub fn edit(
    workspace: &Workspace,
    output: &Output,
    target: &TodoRef,
    text: Option<String>,
    due_date: Option<Option<NaiveDate>>,
) -> Result<()> {
    let mut store = workspace.store();
    flush_warnings(&mut store, output);

    let Some(todo) = store.resolve(target).and_then(|id| store.todos().get(&id)) else {
        output.warn(&format!("No todo matches {}; nothing changed", target));
        return Ok(());
    };

    let mut dialog = EditDialog::default();
    dialog.open(todo);

    if let Some(draft) = dialog.draft_mut() {
        if let Some(text) = text {
            draft.text = text;
        }
        if let Some(due) = due_date {
            draft.due_date = due
                .map(|d| d.format(DUE_DATE_FORMAT).to_string())
                .unwrap_or_default();
        }
    }

    let policy = workspace.config().workspace.blank_edit;
    output.verbose_ctx("edit", &format!("Saving draft with blank policy {:?}", policy));

    let outcome = dialog.save(&mut store, policy);
    flush_warnings(&mut store, output);

    match outcome {
        SaveOutcome::Committed(id) => {
            if output.is_json() {
                let position = store.todos().position_of(&id).unwrap_or_default();
                if let Some(todo) = store.todos().get(&id) {
                    output.data(&todo_json(position, todo, todo.is_overdue(today())));
                }
            } else {
                output.success(&format!("Updated {}", id));
            }
        }
        SaveOutcome::BlankRejected => {
            output.warn("Todo text cannot be blank; edit rejected, nothing changed")
        }
        SaveOutcome::BlankDiscarded => {
            output.warn("Todo text cannot be blank; edit discarded, nothing changed")
        }
        SaveOutcome::InvalidDueDate(input) => {
            output.warn(&format!("Invalid due date '{}'; nothing changed", input))
        }
        SaveOutcome::Missing(id) => output.warn(&format!("Todo {} no longer exists", id)),
        SaveOutcome::NotOpen => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Todo, TodoList};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn entry_line_marks_overdue() {
        let todo = Todo::create("Buy milk", Some(date("2024-01-01")));
        let entry = Entry {
            position: 2,
            todo: &todo,
            overdue: true,
        };

        let line = entry_line(&entry);
        assert!(line.starts_with("  2  t-"));
        assert!(line.contains("[ ] Buy milk"));
        assert!(line.ends_with("(due 2024-01-01, OVERDUE)"));
    }

    #[test]
    fn entry_line_without_due_date() {
        let mut list = TodoList::new();
        list.add("Walk dog", None).unwrap();
        list.toggle_at(0).unwrap();
        let view = partition(&list, date("2024-06-01"));

        let line = entry_line(&view.completed[0]);
        assert!(line.ends_with("[x] Walk dog"));
    }

    #[test]
    fn todo_json_shape() {
        let todo = Todo::create("Buy milk", None);
        let value = todo_json(0, &todo, false);

        assert_eq!(value["text"], "Buy milk");
        assert_eq!(value["done"], false);
        assert!(value["dueDate"].is_null());
        assert_eq!(value["id"], todo.id.to_string());
    }
}
