//! Interactive TUI for the todo list
//!
//! Shows the active and completed groups, and edits todos through a modal
//! dialog, using ratatui.

mod app;
mod event;
mod ui;
mod utils;
mod views;

use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};

use super::Output;
use crate::storage::Workspace;
use app::App;
use event::EventHandler;

/// Launch the TUI
pub fn run(workspace: &Workspace, output: &Output) -> Result<()> {
    output.verbose_ctx("tui", "Initializing TUI application");

    // Open the store before touching the terminal so load problems are
    // still printed normally
    let mut store = workspace.store();
    output.store_warnings(store.take_warnings());
    let config = workspace.config();
    let mut app = App::new(store, &config.workspace);

    output.verbose_ctx(
        "tui",
        &format!("Tick rate: {}ms", config.global.tick_rate_ms),
    );

    let mut terminal = ui::init_terminal()?;
    let event_handler = EventHandler::new(config.global.tick_rate_ms);

    // Run the main loop with panic safety
    // This ensures terminal is restored even if the app panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        app.run(&mut terminal, event_handler)
    }));

    // Always restore terminal, even on panic
    let restore_result = ui::restore_terminal();

    let result = match result {
        Ok(inner_result) => {
            restore_result?;
            inner_result
        }
        Err(panic_payload) => {
            let _ = restore_result;
            if let Some(s) = panic_payload.downcast_ref::<&str>() {
                Err(anyhow!("TUI panicked: {}", s))
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                Err(anyhow!("TUI panicked: {}", s))
            } else {
                Err(anyhow!("TUI panicked with unknown error"))
            }
        }
    };

    // A storage warning still on the status bar is repeated on stderr
    if let Some(message) = app.status_message().filter(|m| m.starts_with("Warning:")) {
        output.warn(message.trim_start_matches("Warning: "));
    }

    result
}

/// Renders into an in-memory buffer and returns the plain text
#[cfg(test)]
pub(crate) fn render_to_string<F>(width: u16, height: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame),
{
    use ratatui::backend::TestBackend;

    let mut terminal = ratatui::Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(f).unwrap();

    let buffer = terminal.backend().buffer().clone();
    buffer
        .content
        .chunks(buffer.area.width as usize)
        .map(|row| {
            let line: String = row.iter().map(|cell| cell.symbol()).collect();
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
