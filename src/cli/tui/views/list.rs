//! List view: active and completed groups plus status bar

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::cli::tui::app::{App, InputMode};
use crate::cli::tui::utils::truncate_str;
use crate::domain::{Entry, Summary, DUE_DATE_FORMAT};
use crate::storage::KvStore;

/// Draw the list layout
pub fn draw<S: KvStore>(frame: &mut Frame, app: &App<S>) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Todos
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    let view = app.partition();
    let summary = view.summary();

    if summary.total == 0 {
        draw_empty(frame, chunks[0]);
    } else {
        draw_groups(frame, app, &view.active, &view.completed, chunks[0]);
    }
    draw_status_bar(frame, app, summary, chunks[1]);
}

fn draw_empty(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new("No todos yet. Press n to add one.")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title("Todos").borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}

/// Formats one todo row
fn entry_item(entry: &Entry<'_>, width: usize) -> ListItem<'static> {
    let todo = entry.todo;
    let check = if todo.done { "[x]" } else { "[ ]" };

    let due = todo.due_date.map(|d| d.format(DUE_DATE_FORMAT).to_string());
    let due_width = due.as_ref().map_or(0, |d| d.len() + 6);
    let overdue_width = if entry.overdue { 9 } else { 0 };
    let text_width = width.saturating_sub(8 + due_width + overdue_width).max(10);

    let text_style = if todo.done {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw(format!("  {} ", check)),
        Span::styled(truncate_str(&todo.text, text_width), text_style),
    ];

    if let Some(due) = due {
        spans.push(Span::styled(
            format!("  due {}", due),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if entry.overdue {
        spans.push(Span::styled(
            "  OVERDUE",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    ListItem::new(Line::from(spans))
}

fn group_header(title: &str, count: usize, color: Color) -> ListItem<'static> {
    ListItem::new(format!("{} ({})", title, count))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
}

/// Draw both groups; rows are numbered across groups, skipping headers
fn draw_groups<S: KvStore>(
    frame: &mut Frame,
    app: &App<S>,
    active: &[Entry<'_>],
    completed: &[Entry<'_>],
    area: Rect,
) {
    let width = area.width.saturating_sub(4) as usize;
    let mut items: Vec<ListItem> = Vec::new();
    let mut selected_flat_index = None;
    let mut row = 0;

    items.push(group_header("Active", active.len(), Color::Green));
    for entry in active {
        if row == app.selected() {
            selected_flat_index = Some(items.len());
        }
        items.push(entry_item(entry, width));
        row += 1;
    }

    if app.show_completed() {
        items.push(group_header("Completed", completed.len(), Color::DarkGray));
        for entry in completed {
            if row == app.selected() {
                selected_flat_index = Some(items.len());
            }
            items.push(entry_item(entry, width));
            row += 1;
        }
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title("Todos")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(selected_flat_index);

    frame.render_stateful_widget(list, area, &mut state);
}

fn summary_line(summary: Summary, show_completed: bool) -> String {
    let mut line = format!(
        "{} active, {} completed",
        summary.active, summary.completed
    );
    if summary.overdue > 0 {
        line.push_str(&format!(", {} overdue", summary.overdue));
    }
    if !show_completed {
        line.push_str(" (completed hidden)");
    }
    line
}

/// Draw the status bar
fn draw_status_bar<S: KvStore>(frame: &mut Frame, app: &App<S>, summary: Summary, area: Rect) {
    let hints = "[n]ew [e]dit [space]toggle [d]elete [c]ompleted [r]eload [?]help [q]uit";

    let (content, style) = match app.status_message() {
        Some(msg) if msg.starts_with("Warning:") => {
            (msg.to_string(), Style::default().fg(Color::Yellow))
        }
        Some(msg) => (msg.to_string(), Style::default()),
        None => (hints.to_string(), Style::default()),
    };

    let mode = match app.input_mode() {
        _ if app.dialog().is_open() => "[EDIT]",
        InputMode::NewTodo(_) => "[NEW]",
        InputMode::Confirm(_) => "[CONFIRM]",
        InputMode::Help => "[HELP]",
        InputMode::Normal => "",
    };

    let status_text = format!(
        "Todo {} | {} | {}",
        mode,
        summary_line(summary, app.show_completed()),
        content
    );

    let paragraph = Paragraph::new(status_text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}
