//! Popups drawn over the list: edit dialog, new-todo form, confirm, help

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::cli::tui::app::{App, NewTodo};
use crate::cli::tui::utils::{centered_rect, truncate_str};
use crate::domain::{DraftField, Todo};
use crate::storage::KvStore;

const POPUP_WIDTH: u16 = 60;

/// Draw the edit dialog for the open draft
pub fn draw_edit<S: KvStore>(frame: &mut Frame, app: &App<S>) {
    if let Some(draft) = app.dialog().draft() {
        let title = format!(" Edit {} ", draft.id);
        draw_form(frame, &title, &draft.text, &draft.due_date, draft.field);
    }
}

/// Draw the new-todo form
pub fn draw_new(frame: &mut Frame, form: &NewTodo) {
    draw_form(frame, " New todo ", &form.text, &form.due_date, form.field);
}

fn field_line<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = if focused { "_" } else { "" };

    Line::from(vec![
        Span::styled(label, label_style),
        Span::raw(format!("{}{}", value, cursor)),
    ])
}

fn draw_form(frame: &mut Frame, title: &str, text: &str, due_date: &str, field: DraftField) {
    let dim_style = Style::default().fg(Color::DarkGray);

    let lines = vec![
        Line::from(""),
        field_line("  Text: ", text, field == DraftField::Text),
        field_line("  Due:  ", due_date, field == DraftField::DueDate),
        Line::from(Span::styled("        YYYY-MM-DD, empty for none", dim_style)),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter", dim_style),
            Span::raw(" save  "),
            Span::styled("Esc", dim_style),
            Span::raw(" cancel  "),
            Span::styled("Tab", dim_style),
            Span::raw(" switch field"),
        ]),
    ];

    let area = centered_rect(POPUP_WIDTH, lines.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(paragraph, area);
}

/// Draw the delete confirmation
pub fn draw_confirm_remove(frame: &mut Frame, todo: &Todo) {
    let lines = vec![
        Line::from(""),
        Line::from(format!(
            "  Delete \"{}\"?",
            truncate_str(&todo.text, POPUP_WIDTH as usize - 16)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  [y] delete  [n] keep",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let area = centered_rect(POPUP_WIDTH, lines.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    frame.render_widget(paragraph, area);
}

/// Draw the key binding overlay
pub fn draw_help(frame: &mut Frame) {
    let bindings = [
        ("j / k", "move down / up"),
        ("g / G", "first / last"),
        ("space, x", "toggle done"),
        ("e, Enter", "edit"),
        ("n, a", "new todo"),
        ("d", "delete"),
        ("c", "show / hide completed"),
        ("r", "reload from disk"),
        ("q", "quit"),
    ];

    let mut lines = vec![Line::from("")];
    for (keys, action) in bindings {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<10}", keys), Style::default().fg(Color::Cyan)),
            Span::raw(action),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press any key to close",
        Style::default().fg(Color::DarkGray),
    )));

    let area = centered_rect(44, lines.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Keys ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tui::render_to_string;
    use crate::storage::{MemoryKvStore, TodoStore, WorkspaceConfig, TODOS_KEY};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use serde_json::json;

    #[test]
    fn edit_dialog_shows_draft() {
        let backend = MemoryKvStore::with_value(
            TODOS_KEY,
            json!([{"text": "Buy milk", "done": false, "dueDate": "2024-01-01"}]).to_string(),
        );
        let mut app = App::new(TodoStore::open(backend), &WorkspaceConfig::default());
        app.handle_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE));

        let screen = render_to_string(80, 24, |frame| app.draw(frame));

        assert!(screen.contains(" Edit t-"));
        assert!(screen.contains("Text: Buy milk_"));
        assert!(screen.contains("Due:  2024-01-01"));
    }

    #[test]
    fn new_form_marks_focused_field() {
        let form = NewTodo {
            text: "Walk dog".to_string(),
            due_date: "2024".to_string(),
            field: DraftField::DueDate,
        };

        let screen = render_to_string(80, 24, |frame| draw_new(frame, &form));

        assert!(screen.contains("New todo"));
        assert!(screen.contains("Text: Walk dog "));
        assert!(screen.contains("Due:  2024_"));
    }

    #[test]
    fn confirm_names_the_todo() {
        let todo = Todo::create("Buy milk", None);

        let screen = render_to_string(80, 24, |frame| draw_confirm_remove(frame, &todo));

        assert!(screen.contains("Delete \"Buy milk\"?"));
    }

    #[test]
    fn help_lists_bindings() {
        let screen = render_to_string(80, 24, draw_help);

        assert!(screen.contains("toggle done"));
        assert!(screen.contains("Press any key to close"));
    }
}
