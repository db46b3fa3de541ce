//! # Command-Line Interface
//!
//! User-facing commands, output formatting and the interactive view.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Create a `.todo/` workspace |
//! | `add`, `edit`, `remove` | Change the list |
//! | `toggle` (`done`) | Flip a todo between active and completed |
//! | `list` | Active and completed groups with overdue marks |
//! | `tui` | Interactive view |
//!
//! Todos are addressed by ID (`t-xxxxxxx`) or by 0-based position.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! todo --verbose list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod todo_cmd;
mod tui;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
